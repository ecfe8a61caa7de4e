use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{debug, info, instrument};

use super::dto::{
    AdvancedMetrics, AdvisoryResponse, CityQuery, History, LiveQuery, OutlookResponse,
    PredictQuery, HISTORY_LIMIT,
};
use crate::{
    auth::extractors::CurrentUser,
    error::AppError,
    response::{ok, Envelope},
    sim::{
        advisory::advisory_for,
        exposure::{self, EnvironmentInputs, WearableReading},
        hash::current_aqi,
        outlook::seven_day_outlook,
        prediction::predict,
    },
    state::AppState,
    store::{AqiRecord, Location, NewAqiRecord, NewPrediction, Prediction},
};

pub fn aqi_routes() -> Router<AppState> {
    Router::new()
        .route("/aqi/live", get(live))
        .route("/aqi/predict", get(prediction))
        .route("/aqi/history", get(history))
        .route("/aqi/advanced", get(advanced))
        .route("/aqi/advisory", get(advisory))
        .route("/aqi/forecast", get(forecast))
}

fn query<T>(q: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    q.map(|Query(q)| q)
        .map_err(|e| AppError::Validation(e.body_text()))
}

/// Generates the city's current reading and appends it to the caller's history.
#[instrument(skip(state, user, q), fields(user_id = %user.id))]
pub async fn live(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    q: Result<Query<LiveQuery>, QueryRejection>,
) -> Result<Json<Envelope<AqiRecord>>, AppError> {
    let q = query(q)?;
    let city = q.city();
    let (latitude, longitude) = q.coordinates()?;
    let aqi = current_aqi(&city);
    let pm25 = aqi * 3 / 10;
    let advisory = advisory_for(aqi);

    let record = state
        .store
        .create_aqi_record(NewAqiRecord {
            user: user.id,
            location: Location {
                city: Some(city),
                latitude: Some(latitude),
                longitude: Some(longitude),
            },
            aqi,
            pm25,
            pm10: pm25 + 10,
            risk_level: Some(advisory.level.to_string()),
            color: Some(advisory.color.to_string()),
        })
        .await?;

    debug!(record_id = %record.id, aqi, "live reading stored");
    Ok(ok(record))
}

#[instrument(skip(state, _user, q))]
pub async fn prediction(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    q: Result<Query<PredictQuery>, QueryRejection>,
) -> Result<Json<Envelope<Prediction>>, AppError> {
    let (city, overrides) = query(q)?.into_parts()?;
    let outcome = state
        .simulator
        .draw(|rng| predict(&city, current_aqi(&city), overrides, rng));

    let prediction = state
        .store
        .create_prediction(NewPrediction {
            location: Location {
                city: Some(outcome.city),
                ..Location::default()
            },
            predicted_aqi: outcome.predicted_aqi,
            classification: outcome.classification,
            trend: outcome.trend,
            factors: outcome.factors,
            forecast_date: OffsetDateTime::now_utc() + time::Duration::days(1),
        })
        .await?;

    info!(
        prediction_id = %prediction.id,
        predicted_aqi = prediction.predicted_aqi,
        classification = ?prediction.classification,
        "prediction stored"
    );
    Ok(ok(prediction))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn history(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Envelope<History>>, AppError> {
    let records = state.store.list_aqi_by_user(user.id, HISTORY_LIMIT).await?;
    if records.is_empty() {
        debug!("no history yet, returning sample readings");
        return Ok(ok(History::sample(OffsetDateTime::now_utc())));
    }
    Ok(ok(History::Recorded(records)))
}

/// Simulated wearable + environment snapshot and the exposure score built from it.
#[instrument(skip(state, _user, q))]
pub async fn advanced(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    q: Result<Query<CityQuery>, QueryRejection>,
) -> Result<Json<Envelope<AdvancedMetrics>>, AppError> {
    let city = query(q)?.city();
    let aqi = current_aqi(&city);

    let metrics = state.simulator.draw(|rng| {
        let wearable = WearableReading::simulate(rng);
        let env = EnvironmentInputs::simulate(aqi, rng);
        let assessment = exposure::assess(f64::from(env.hyperlocal_aqi), &wearable);
        let forecast = exposure::forecast_exposure(assessment.score, rng);
        AdvancedMetrics {
            wearable,
            env,
            score: assessment.score,
            category: assessment.category,
            forecast_score: forecast.score,
            forecast_trend: forecast.trend,
            recommendation: exposure::recommendation(assessment.category),
        }
    });

    debug!(%city, score = metrics.score, category = ?metrics.category, "exposure assessed");
    Ok(ok(metrics))
}

#[instrument(skip(_user, q))]
pub async fn advisory(
    CurrentUser(_user): CurrentUser,
    q: Result<Query<CityQuery>, QueryRejection>,
) -> Result<Json<Envelope<AdvisoryResponse>>, AppError> {
    let city = query(q)?.city();
    let aqi = current_aqi(&city);
    Ok(ok(AdvisoryResponse {
        city,
        aqi,
        advisory: advisory_for(aqi),
    }))
}

#[instrument(skip(state, _user, q))]
pub async fn forecast(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    q: Result<Query<CityQuery>, QueryRejection>,
) -> Result<Json<Envelope<OutlookResponse>>, AppError> {
    let city = query(q)?.city();
    let aqi = current_aqi(&city);
    let today = OffsetDateTime::now_utc().date();
    let days = state
        .simulator
        .draw(|rng| seven_day_outlook(aqi, today, rng));
    Ok(ok(OutlookResponse {
        city,
        current_aqi: aqi,
        days,
    }))
}
