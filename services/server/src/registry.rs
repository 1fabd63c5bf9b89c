use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, RwLock};

pub type ConnId = u64;

/// A frame or close directive delivered to a connection's task from
/// somewhere else in the server (the forwarder, an alarm broadcast, a
/// superseding login). The task's own socket writes never go through this
/// channel; only cross-task delivery does.
#[derive(Debug)]
pub enum Outbound {
    Frame(Vec<u8>),
    Close(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Unbound,
    Equipment { device_id: String },
    Operator { user_id: i64, role: String },
}

struct ConnEntry {
    identity: Identity,
    last_heartbeat: Instant,
    healthy: bool,
    sender: mpsc::Sender<Outbound>,
}

#[derive(Default)]
struct RegistryInner {
    conns: HashMap<ConnId, ConnEntry>,
    device_to_conn: HashMap<String, ConnId>,
    user_to_conn: HashMap<i64, ConnId>,
}

/// The connection registry: fd/identity mapping, enforces that at most one
/// connection may hold a given device id at a time, and the user-id
/// last-wins policy for operator re-login. All four logical mappings live
/// behind one lock so a bind is atomic with respect to any concurrent
/// lookup.
pub struct ConnectionRegistry {
    inner: RwLock<RegistryInner>,
    next_id: AtomicU64,
}

pub struct BoundConnection {
    pub id: ConnId,
}

impl ConnectionRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: RwLock::new(RegistryInner::default()),
            next_id: AtomicU64::new(1),
        })
    }

    /// Registers a freshly accepted connection with an unbound identity.
    pub async fn accept(&self, sender: mpsc::Sender<Outbound>) -> BoundConnection {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.inner.write().await;
        inner.conns.insert(
            id,
            ConnEntry {
                identity: Identity::Unbound,
                last_heartbeat: Instant::now(),
                healthy: true,
                sender,
            },
        );
        BoundConnection { id }
    }

    /// Binds `conn` as the connection for `device_id`. Fails (without
    /// mutating anything) if another connection already holds that device
    /// id.
    pub async fn bind_equipment(&self, conn: ConnId, device_id: &str) -> Result<(), ()> {
        let mut inner = self.inner.write().await;
        if inner.device_to_conn.contains_key(device_id) {
            return Err(());
        }
        if let Some(entry) = inner.conns.get_mut(&conn) {
            entry.identity = Identity::Equipment {
                device_id: device_id.to_owned(),
            };
            entry.last_heartbeat = Instant::now();
            inner.device_to_conn.insert(device_id.to_owned(), conn);
            Ok(())
        } else {
            Err(())
        }
    }

    /// Binds `conn` as the connection for `user_id`. If an older connection
    /// already holds that user id (last-wins re-login), returns its id and
    /// sender so the caller can close it with `session_superseded` before
    /// the new binding takes effect.
    pub async fn bind_operator(
        &self,
        conn: ConnId,
        user_id: i64,
        role: &str,
    ) -> Option<(ConnId, mpsc::Sender<Outbound>)> {
        let mut inner = self.inner.write().await;
        let superseded = inner.user_to_conn.insert(user_id, conn).and_then(|old| {
            if old == conn {
                None
            } else {
                inner
                    .conns
                    .get(&old)
                    .map(|entry| (old, entry.sender.clone()))
            }
        });
        if let Some(entry) = inner.conns.get_mut(&conn) {
            entry.identity = Identity::Operator {
                user_id,
                role: role.to_owned(),
            };
            entry.last_heartbeat = Instant::now();
        }
        superseded
    }

    pub async fn touch(&self, conn: ConnId) {
        let mut inner = self.inner.write().await;
        if let Some(entry) = inner.conns.get_mut(&conn) {
            entry.last_heartbeat = Instant::now();
        }
    }

    /// Removes every reference to `conn`. Returns the identity it held so
    /// the caller can transition a device catalog entry offline.
    pub async fn unbind(&self, conn: ConnId) -> Identity {
        let mut inner = self.inner.write().await;
        let Some(entry) = inner.conns.remove(&conn) else {
            return Identity::Unbound;
        };
        match &entry.identity {
            Identity::Equipment { device_id } => {
                if inner.device_to_conn.get(device_id) == Some(&conn) {
                    inner.device_to_conn.remove(device_id);
                }
            }
            Identity::Operator { user_id, .. } => {
                if inner.user_to_conn.get(user_id) == Some(&conn) {
                    inner.user_to_conn.remove(user_id);
                }
            }
            Identity::Unbound => {}
        }
        entry.identity
    }

    pub async fn identity(&self, conn: ConnId) -> Identity {
        self.inner
            .read()
            .await
            .conns
            .get(&conn)
            .map(|e| e.identity.clone())
            .unwrap_or(Identity::Unbound)
    }

    pub async fn lookup_device(&self, device_id: &str) -> Option<(ConnId, mpsc::Sender<Outbound>)> {
        let inner = self.inner.read().await;
        let conn = *inner.device_to_conn.get(device_id)?;
        let sender = inner.conns.get(&conn)?.sender.clone();
        Some((conn, sender))
    }

    /// Every currently bound operator connection's outbound sender, used
    /// to fan control_response replies and alarm alerts out to all of them.
    pub async fn operator_senders(&self) -> Vec<mpsc::Sender<Outbound>> {
        let inner = self.inner.read().await;
        inner
            .conns
            .values()
            .filter(|e| matches!(e.identity, Identity::Operator { .. }))
            .map(|e| e.sender.clone())
            .collect()
    }

    /// Snapshot for the supervisor's heartbeat sweep: every connection's id
    /// and how long it has been idle.
    pub async fn snapshot(&self) -> Vec<(ConnId, Instant)> {
        self.inner
            .read()
            .await
            .conns
            .iter()
            .map(|(id, e)| (*id, e.last_heartbeat))
            .collect()
    }

    pub async fn mark_unhealthy(&self, conn: ConnId) {
        let mut inner = self.inner.write().await;
        if let Some(entry) = inner.conns.get_mut(&conn) {
            entry.healthy = false;
        }
    }

    pub async fn sender(&self, conn: ConnId) -> Option<mpsc::Sender<Outbound>> {
        self.inner.read().await.conns.get(&conn).map(|e| e.sender.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sender() -> mpsc::Sender<Outbound> {
        mpsc::channel(8).0
    }

    #[tokio::test]
    async fn duplicate_device_bind_is_rejected() {
        let registry = ConnectionRegistry::new();
        let a = registry.accept(sender()).await;
        let b = registry.accept(sender()).await;

        assert!(registry.bind_equipment(a.id, "proj_101").await.is_ok());
        assert!(registry.bind_equipment(b.id, "proj_101").await.is_err());
        assert_eq!(
            registry.identity(a.id).await,
            Identity::Equipment {
                device_id: "proj_101".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn operator_relogin_supersedes_old_connection() {
        let registry = ConnectionRegistry::new();
        let a = registry.accept(sender()).await;
        let b = registry.accept(sender()).await;

        assert!(registry.bind_operator(a.id, 7, "student").await.is_none());
        let superseded = registry.bind_operator(b.id, 7, "student").await;
        assert_eq!(superseded.map(|(id, _)| id), Some(a.id));
        assert_eq!(
            registry.identity(b.id).await,
            Identity::Operator {
                user_id: 7,
                role: "student".to_owned()
            }
        );
    }

    #[tokio::test]
    async fn unbind_removes_device_mapping() {
        let registry = ConnectionRegistry::new();
        let a = registry.accept(sender()).await;
        registry.bind_equipment(a.id, "proj_101").await.unwrap();
        registry.unbind(a.id).await;
        assert!(registry.lookup_device("proj_101").await.is_none());
    }
}
