//! File-backed record store for users, AQI readings and predictions.

mod collection;
pub mod models;

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use collection::{Collection, Record};
pub use models::{
    AqiRecord, Location, NewAqiRecord, NewPrediction, NewUser, Prediction, User, UserUpdate,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,

    #[error("{op} {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    fn io(op: &'static str, path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            op,
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Record for User {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Record for AqiRecord {
    fn id(&self) -> Uuid {
        self.id
    }

    fn partition(&self) -> Option<Uuid> {
        Some(self.user)
    }
}

impl Record for Prediction {
    fn id(&self) -> Uuid {
        self.id
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct Store {
    users: Collection<User>,
    /// Normalized email to user id. Only changed while `users` is locked.
    emails: RwLock<HashMap<String, Uuid>>,
    /// Partitioned by owning user.
    aqi: Collection<AqiRecord>,
    predictions: Collection<Prediction>,
}

impl Store {
    /// Opens (creating if needed) the collections under `data_dir` and
    /// indexes existing users by email.
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = data_dir.as_ref();
        let users: Collection<User> = Collection::open(root.join("users")).await?;

        let mut emails = HashMap::new();
        for user in users.all().await? {
            let email = normalize_email(&user.email);
            if let Some(first) = emails.get(&email) {
                warn!(%email, kept = %first, skipped = %user.id, "email registered twice");
                continue;
            }
            emails.insert(email, user.id);
        }

        let store = Self {
            users,
            emails: RwLock::new(emails),
            aqi: Collection::open(root.join("aqi")).await?,
            predictions: Collection::open(root.join("predictions")).await?,
        };
        info!(
            data_dir = %root.display(),
            users = store.emails.read().await.len(),
            "record store opened"
        );
        Ok(store)
    }

    pub async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        self.users.get(id).await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let id = self.emails.read().await.get(&normalize_email(email)).copied();
        match id {
            // None if the file has since been quarantined
            Some(id) => self.users.get(id).await,
            None => Ok(None),
        }
    }

    /// Creates a user unless the normalized email is already taken.
    #[instrument(skip(self, new), fields(email = %new.email))]
    pub async fn create_user(&self, new: NewUser) -> Result<User, StoreError> {
        let _guard = self.users.lock().await;

        let email = normalize_email(&new.email);
        if self.find_user_by_email(&email).await?.is_some() {
            return Err(StoreError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            first_name: new.first_name,
            last_name: new.last_name,
            email,
            password_hash: new.password_hash,
            location: new.location,
            created_at: OffsetDateTime::now_utc(),
        };
        self.users.put(&user).await?;
        self.emails.write().await.insert(user.email.clone(), user.id);
        Ok(user)
    }

    /// Applies the present fields of `updates`. `Ok(None)` for an unknown id.
    pub async fn update_user(
        &self,
        id: Uuid,
        updates: UserUpdate,
    ) -> Result<Option<User>, StoreError> {
        let _guard = self.users.lock().await;

        let Some(mut user) = self.users.get(id).await? else {
            return Ok(None);
        };
        if let Some(first_name) = updates.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = updates.last_name {
            user.last_name = Some(last_name);
        }
        if let Some(location) = updates.location {
            user.location = location;
        }
        if let Some(password_hash) = updates.password_hash {
            user.password_hash = password_hash;
        }
        self.users.put(&user).await?;
        Ok(Some(user))
    }

    pub async fn create_aqi_record(&self, new: NewAqiRecord) -> Result<AqiRecord, StoreError> {
        let record = AqiRecord {
            id: Uuid::new_v4(),
            user: new.user,
            location: new.location,
            aqi: new.aqi,
            pm25: new.pm25,
            pm10: new.pm10,
            risk_level: new.risk_level,
            color: new.color,
            recorded_at: OffsetDateTime::now_utc(),
        };
        let _guard = self.aqi.lock().await;
        self.aqi.put(&record).await?;
        Ok(record)
    }

    /// A user's readings, newest first.
    pub async fn list_aqi_by_user(
        &self,
        user: Uuid,
        limit: usize,
    ) -> Result<Vec<AqiRecord>, StoreError> {
        let mut records = self.aqi.all_in(user).await?;
        records.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        records.truncate(limit);
        Ok(records)
    }

    pub async fn create_prediction(&self, new: NewPrediction) -> Result<Prediction, StoreError> {
        let prediction = Prediction {
            id: Uuid::new_v4(),
            location: new.location,
            predicted_aqi: new.predicted_aqi,
            classification: new.classification,
            trend: new.trend,
            factors: new.factors,
            forecast_date: new.forecast_date,
            created_at: OffsetDateTime::now_utc(),
        };
        let _guard = self.predictions.lock().await;
        self.predictions.put(&prediction).await?;
        Ok(prediction)
    }

    pub async fn find_prediction(&self, id: Uuid) -> Result<Option<Prediction>, StoreError> {
        self.predictions.get(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{
        prediction::{PredictionFactors, Trend},
        RiskCategory,
    };

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Ada".into(),
            last_name: Some("Lovelace".into()),
            email: email.into(),
            password_hash: "$argon2id$fake".into(),
            location: Location {
                city: Some("London".into()),
                ..Location::default()
            },
        }
    }

    fn reading(user: Uuid, aqi: u32) -> NewAqiRecord {
        NewAqiRecord {
            user,
            location: Location::default(),
            aqi,
            pm25: aqi * 3 / 10,
            pm10: aqi * 3 / 10 + 10,
            risk_level: None,
            color: None,
        }
    }

    #[tokio::test]
    async fn create_and_find_user_case_insensitively() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let store = Store::open(tmp.path()).await.expect("open");

        let created = store.create_user(new_user("  Ada@Example.COM ")).await.expect("create");
        assert_eq!(created.email, "ada@example.com");

        let by_email = store
            .find_user_by_email("ADA@example.com")
            .await
            .expect("find")
            .expect("present");
        assert_eq!(by_email.id, created.id);

        let by_id = store.find_user_by_id(created.id).await.expect("find").expect("present");
        assert_eq!(by_id.first_name, "Ada");
        assert!(store.find_user_by_id(Uuid::new_v4()).await.expect("find").is_none());
    }

    #[tokio::test]
    async fn duplicate_email_creates_nothing() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let store = Store::open(tmp.path()).await.expect("open");

        store.create_user(new_user("ada@example.com")).await.expect("first");
        let err = store.create_user(new_user("ADA@EXAMPLE.COM")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(store.users.all().await.expect("all").len(), 1);
    }

    #[tokio::test]
    async fn concurrent_signups_for_one_email_yield_one_user() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let store = std::sync::Arc::new(Store::open(tmp.path()).await.expect("open"));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create_user(new_user("race@example.com")).await })
            })
            .collect();
        let mut created = 0;
        for h in handles {
            if h.await.expect("join").is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.users.all().await.expect("all").len(), 1);
    }

    #[tokio::test]
    async fn update_touches_only_supplied_fields() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let store = Store::open(tmp.path()).await.expect("open");
        let user = store.create_user(new_user("ada@example.com")).await.expect("create");

        let updated = store
            .update_user(
                user.id,
                UserUpdate {
                    first_name: Some("Augusta".into()),
                    ..UserUpdate::default()
                },
            )
            .await
            .expect("update")
            .expect("present");
        assert_eq!(updated.first_name, "Augusta");
        assert_eq!(updated.last_name.as_deref(), Some("Lovelace"));
        assert_eq!(updated.location, user.location);
        assert_eq!(updated.password_hash, user.password_hash);

        let reloaded = store.find_user_by_id(user.id).await.expect("find").expect("present");
        assert_eq!(reloaded.first_name, "Augusta");

        let missing = store
            .update_user(Uuid::new_v4(), UserUpdate::default())
            .await
            .expect("update");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn history_is_per_user_newest_first_and_limited() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let store = Store::open(tmp.path()).await.expect("open");
        let me = Uuid::new_v4();
        let someone_else = Uuid::new_v4();

        for aqi in 20..35 {
            store.create_aqi_record(reading(me, aqi)).await.expect("record");
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }
        store.create_aqi_record(reading(someone_else, 99)).await.expect("record");

        let history = store.list_aqi_by_user(me, 10).await.expect("list");
        assert_eq!(history.len(), 10);
        assert!(history.iter().all(|r| r.user == me));
        assert_eq!(history[0].aqi, 34);
        assert!(history
            .windows(2)
            .all(|w| w[0].recorded_at >= w[1].recorded_at));

        assert!(store.list_aqi_by_user(Uuid::new_v4(), 10).await.expect("list").is_empty());

        let own_dir = tmp.path().join("aqi").join(me.to_string());
        assert_eq!(std::fs::read_dir(own_dir).expect("user dir").count(), 15);
    }

    #[tokio::test]
    async fn email_index_survives_reopen() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let created = {
            let store = Store::open(tmp.path()).await.expect("open");
            store.create_user(new_user("ada@example.com")).await.expect("create")
        };

        let store = Store::open(tmp.path()).await.expect("reopen");
        let found = store
            .find_user_by_email(" ADA@example.com")
            .await
            .expect("find")
            .expect("indexed on open");
        assert_eq!(found.id, created.id);
        let err = store.create_user(new_user("ada@EXAMPLE.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));

        std::fs::write(
            tmp.path().join("users").join(format!("{}.json", created.id)),
            b"garbage",
        )
        .expect("corrupt");
        assert!(store.find_user_by_email("ada@example.com").await.expect("find").is_none());
        let again = store.create_user(new_user("ada@example.com")).await.expect("re-register");
        assert_ne!(again.id, created.id);
    }

    #[tokio::test]
    async fn corrupt_record_is_quarantined_not_erased() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let store = Store::open(tmp.path()).await.expect("open");
        let user = store.create_user(new_user("ada@example.com")).await.expect("create");

        let bad_id = Uuid::new_v4();
        let bad_path = tmp.path().join("users").join(format!("{bad_id}.json"));
        std::fs::write(&bad_path, b"{ not json").expect("write corrupt");

        let users = store.users.all().await.expect("all");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].id, user.id);

        assert!(!bad_path.exists());
        let quarantined = tmp.path().join("users").join(format!("{bad_id}.json.corrupt"));
        assert_eq!(std::fs::read(quarantined).expect("kept"), b"{ not json");
    }

    #[tokio::test]
    async fn predictions_are_persisted() {
        let tmp = tempfile::tempdir().expect("tmpdir");
        let store = Store::open(tmp.path()).await.expect("open");
        let now = OffsetDateTime::now_utc();

        let prediction = store
            .create_prediction(NewPrediction {
                location: Location {
                    city: Some("Delhi".into()),
                    ..Location::default()
                },
                predicted_aqi: 88,
                classification: RiskCategory::Critical,
                trend: Trend::Rising,
                factors: PredictionFactors {
                    traffic: 0.4,
                    urbanization: 0.9,
                    wind: 3.0,
                    temperature: 27.0,
                },
                forecast_date: now + time::Duration::days(1),
            })
            .await
            .expect("create");

        let stored = store
            .find_prediction(prediction.id)
            .await
            .expect("get")
            .expect("present");
        assert_eq!(stored.predicted_aqi, 88);
        assert_eq!(stored.trend, Trend::Rising);
        assert!(stored.forecast_date > stored.created_at);
    }
}
