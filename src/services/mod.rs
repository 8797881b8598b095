use std::sync::Arc;

use chrono::{Local, NaiveDate};
use futures::future;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::db::{models::Medicine, DatabaseError, MedicineStore};

use self::{
    alert::{Alert, AlertPolicy},
    notifier::{NotifyError, Notifier},
};

pub mod alert;
pub mod digest;
pub mod notifier;

#[cfg(test)]
pub(crate) mod testing;

/// Outcome of one alert cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub evaluated: usize,
    pub skipped: usize,
    pub alerts_sent: usize,
    pub delivery_failures: usize,
}

/// Schedules the low-stock check.
///
/// Registers a `tokio_cron_scheduler` job on `schedule` (a six-field cron
/// expression, e.g. `0 0 8 * * *` for every day at 08:00 host-local time)
/// that runs [`check_and_alert_low_stock`] against the local calendar day.
///
/// The scheduler is started before it is returned; keep the handle alive for
/// as long as alerts should fire.
pub async fn schedule_alerts(
    schedule: &str,
    store: Arc<dyn MedicineStore>,
    notifier: Arc<dyn Notifier>,
    policy: AlertPolicy,
) -> Result<JobScheduler, JobSchedulerError> {
    let sched = JobScheduler::new().await?;

    let job = Job::new_async_tz(schedule, Local, move |_uuid, _l| {
        let store = store.clone();
        let notifier = notifier.clone();
        Box::pin(async move {
            let today = Local::now().date_naive();
            match check_and_alert_low_stock(store.as_ref(), notifier.as_ref(), &policy, today).await
            {
                Ok(report) => log::info!(
                    "Low stock check: {} evaluated, {} skipped, {} alerts sent, {} failed",
                    report.evaluated,
                    report.skipped,
                    report.alerts_sent,
                    report.delivery_failures
                ),
                Err(e) => log::error!("Error checking stock levels: {}", e),
            }
        })
    })
    .map_err(|e| {
        log::error!("Failed to create job: {}", e);
        e
    })?;

    sched.add(job).await.map_err(|e| {
        log::error!("Failed to add job to scheduler: {}", e);
        e
    })?;

    sched.start().await?;

    log::info!("Alert scheduler started ({})", schedule);
    Ok(sched)
}

/// Runs one alert cycle for `today`.
///
/// 1. Reads one snapshot of medicines and entries. If that fails the cycle
///    stops and nothing is sent.
/// 2. Decides an alert per medicine with [`alert::evaluate`]. Medicines that
///    fail validation are logged and skipped.
/// 3. Sends every alert concurrently. A failed send is logged and counted;
///    a delivered alert is recorded with `update_last_alerted_date`, whose
///    failure is only logged.
pub async fn check_and_alert_low_stock(
    store: &dyn MedicineStore,
    notifier: &dyn Notifier,
    policy: &AlertPolicy,
    today: NaiveDate,
) -> Result<CycleReport, DatabaseError> {
    let snapshot = store.fetch_snapshot().await?;

    let mut report = CycleReport::default();
    let mut alerts = Vec::new();

    for medicine in &snapshot.medicines {
        if let Err(e) = medicine.validate(&snapshot.entries) {
            log::warn!("Skipping {}: {}", medicine.name, e);
            report.skipped += 1;
            continue;
        }
        report.evaluated += 1;

        if let Some(alert) = alert::evaluate(medicine, &snapshot.entries, today, policy) {
            alerts.push((medicine, alert));
        }
    }

    let deliveries = alerts
        .iter()
        .map(|(medicine, alert)| deliver(store, notifier, medicine, alert, today));

    for result in future::join_all(deliveries).await {
        match result {
            Ok(()) => report.alerts_sent += 1,
            Err(_) => report.delivery_failures += 1,
        }
    }

    Ok(report)
}

async fn deliver(
    store: &dyn MedicineStore,
    notifier: &dyn Notifier,
    medicine: &Medicine,
    alert: &Alert,
    today: NaiveDate,
) -> Result<(), NotifyError> {
    let message = alert.render(&medicine.name);

    if let Err(e) = notifier.send(&message).await {
        log::error!("Failed to send alert for {}: {}", medicine.name, e);
        return Err(e);
    }

    if let Err(e) = store.update_last_alerted_date(&medicine.id, today).await {
        log::warn!(
            "Alert for {} was sent but could not be recorded: {}",
            medicine.name,
            e
        );
    }

    Ok(())
}
