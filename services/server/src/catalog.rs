use std::collections::HashMap;
use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::repo;

#[derive(Debug, Clone)]
pub struct EquipmentEntry {
    pub name: String,
    pub r#type: String,
    pub location: String,
    pub place_id: Option<String>,
    pub registration_state: String,
    pub status: String,
    pub power_state: String,
    pub threshold_watts: Option<f64>,
    pub energy_total: f64,
}

impl EquipmentEntry {
    /// registered|pending may connect; anything else (e.g. "unregistered")
    /// rejects an online attempt.
    pub fn may_connect(&self) -> bool {
        matches!(self.registration_state.as_str(), "registered" | "pending")
    }
}

/// In-memory roster of devices plus their live status. Loaded once from the DB at startup; created-new devices are not
/// supported by the core, matching
pub struct EquipmentCatalog {
    devices: RwLock<HashMap<String, EquipmentEntry>>,
}

impl EquipmentCatalog {
    pub async fn load(pool: &PgPool) -> Result<Arc<Self>, sqlx::Error> {
        let rows = repo::equipment::load_all(pool).await?;
        let devices = rows
            .into_iter()
            .map(|r| {
                (
                    r.id,
                    EquipmentEntry {
                        name: r.name,
                        r#type: r.r#type,
                        location: r.location,
                        place_id: r.place_id,
                        registration_state: r.registration_state,
                        status: r.status,
                        power_state: r.power_state,
                        threshold_watts: r.threshold_watts,
                        energy_total: r.energy_total,
                    },
                )
            })
            .collect();
        Ok(Arc::new(Self {
            devices: RwLock::new(devices),
        }))
    }

    pub async fn get(&self, id: &str) -> Option<EquipmentEntry> {
        self.devices.read().await.get(id).cloned()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.devices.read().await.contains_key(id)
    }

    pub async fn set_status_power(&self, id: &str, status: &str, power_state: &str) {
        if let Some(entry) = self.devices.write().await.get_mut(id) {
            entry.status = status.to_owned();
            entry.power_state = power_state.to_owned();
        }
    }

    pub async fn set_power(&self, id: &str, power_state: &str) {
        if let Some(entry) = self.devices.write().await.get_mut(id) {
            entry.power_state = power_state.to_owned();
        }
    }

    pub async fn set_offline(&self, id: &str) {
        if let Some(entry) = self.devices.write().await.get_mut(id) {
            entry.status = "offline".to_owned();
        }
    }

    pub async fn set_threshold(&self, id: &str, watts: f64) {
        if let Some(entry) = self.devices.write().await.get_mut(id) {
            entry.threshold_watts = Some(watts);
        }
    }

    pub async fn add_energy(&self, id: &str, watts: f64) -> Option<f64> {
        let mut devices = self.devices.write().await;
        let entry = devices.get_mut(id)?;
        entry.energy_total += watts;
        Some(entry.energy_total)
    }

    /// Forces every entry offline/off in memory, mirroring the DB
    /// reset-all run at shutdown.
    pub async fn reset_all_offline(&self) {
        let mut devices = self.devices.write().await;
        for entry in devices.values_mut() {
            entry.status = "offline".to_owned();
            entry.power_state = "off".to_owned();
        }
    }
}
