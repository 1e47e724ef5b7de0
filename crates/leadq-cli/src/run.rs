//! `leadq run` — drive one wizard session from a scripted YAML file.
//!
//! ```yaml
//! variant: athlete
//! url: https://nextacademy.example/teste
//! now: 2026-03-10T09:00:00-03:00   # optional, defaults to the wall clock
//! identity:
//!   fullName: Lucas Pereira
//!   birthDate: 2010-05-20
//!   cityState: Campinas/SP
//!   parentName: Ana Pereira
//!   parentPhone: (19) 98765-4321
//! answers:
//!   - { question: 1, points: 24 }
//!   - { question: 2, points: 18 }
//! schedule: { date: 2026-03-11, time: "19:00" }
//! ```
//!
//! Answers are applied in order, each to the question the wizard is
//! showing. The report printed at the end carries the final step, the
//! result, the chosen slot and every delivery notice.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use clap::Args;
use serde::{Deserialize, Serialize};

use leadq_core::{LeadField, LeadInfo};
use leadq_scoring::{QualificationResult, VariantRegistry};
use leadq_webhook::{
    DeliveryError, DeliveryReceipt, DeliveryStage, LeadSink, WebhookClient, WebhookConfig,
};
use leadq_wizard::{parse_slot_time, Notice, SchedulingSelection, WizardController, WizardStep};

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Session script (YAML).
    #[arg(long)]
    pub session: PathBuf,

    /// Record payloads in the report instead of posting them.
    #[arg(long)]
    pub dry_run: bool,
}

/// A scripted session.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Session {
    pub variant: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Fixed "now" for slot availability and timestamps.
    #[serde(default)]
    pub now: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub identity: LeadInfo,
    #[serde(default)]
    pub answers: Vec<ScriptedAnswer>,
    #[serde(default)]
    pub schedule: Option<ScriptedSlot>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScriptedAnswer {
    pub question: u32,
    pub points: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptedSlot {
    pub date: NaiveDate,
    pub time: String,
}

impl Session {
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read session: {}", path.display()))?;
        serde_yaml::from_str(&raw).with_context(|| format!("failed to parse session: {}", path.display()))
    }
}

/// What `leadq run` prints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub step: WizardStep,
    pub result: QualificationResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduling: Option<SchedulingSelection>,
    pub notices: Vec<Notice>,
    /// Captured payloads; only populated on dry runs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deliveries: Vec<CapturedDelivery>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapturedDelivery {
    pub stage: DeliveryStage,
    pub payload: serde_json::Value,
}

/// Sink that accepts everything and keeps the payloads.
#[derive(Debug, Default)]
pub struct DryRunSink {
    captured: Mutex<Vec<CapturedDelivery>>,
}

impl DryRunSink {
    pub fn take(&self) -> Vec<CapturedDelivery> {
        self.captured
            .lock()
            .map(|mut v| std::mem::take(&mut *v))
            .unwrap_or_default()
    }
}

#[async_trait]
impl LeadSink for DryRunSink {
    async fn deliver(
        &self,
        stage: DeliveryStage,
        payload: &serde_json::Value,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        tracing::info!(%stage, "dry run: payload captured");
        if let Ok(mut captured) = self.captured.lock() {
            captured.push(CapturedDelivery {
                stage,
                payload: payload.clone(),
            });
        }
        Ok(DeliveryReceipt {
            endpoint: format!("dry-run:{stage}"),
            attempts: 1,
            status: 200,
        })
    }
}

/// Execute the run subcommand.
pub async fn run_session(
    args: &RunArgs,
    registry: &VariantRegistry,
    webhook: &WebhookConfig,
) -> Result<u8> {
    let session = Session::from_file(&args.session)?;
    let report = if args.dry_run {
        let sink = Arc::new(DryRunSink::default());
        let mut report = execute(&session, registry, sink.clone()).await?;
        report.deliveries = sink.take();
        report
    } else {
        let client = WebhookClient::new(webhook.clone())?;
        execute(&session, registry, Arc::new(client)).await?
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(0)
}

/// Play `session` through a fresh wizard delivering to `sink`.
pub async fn execute(
    session: &Session,
    registry: &VariantRegistry,
    sink: Arc<dyn LeadSink>,
) -> Result<SessionReport> {
    let variant = crate::require_variant(registry, &session.variant)?;
    let mut wizard = WizardController::new(Arc::new(variant.clone()), sink);
    if let Some(url) = &session.url {
        wizard = wizard.with_page_url(url.clone());
    }
    if let Some(now) = session.now {
        wizard = wizard.with_clock(Arc::new(move || now));
    }

    for field in [
        LeadField::FullName,
        LeadField::BirthDate,
        LeadField::CityState,
        LeadField::ParentName,
        LeadField::ParentPhone,
    ] {
        wizard.update_identity(field, session.identity.get(field))?;
    }
    wizard.advance().await.context("identity step 1")?;
    wizard.advance().await.context("identity step 2")?;

    for answer in &session.answers {
        if wizard.step() != WizardStep::Question(answer.question) {
            bail!(
                "session answers question {} but the wizard is at {}",
                answer.question,
                wizard.step()
            );
        }
        wizard.answer(answer.question, answer.points)?;
        wizard.advance().await?;
    }

    if wizard.step() != WizardStep::Scheduling {
        bail!("session ended at {}; not every visible question was answered", wizard.step());
    }

    if let Some(slot) = &session.schedule {
        let time = parse_slot_time(&slot.time)?;
        wizard.schedule_slot(slot.date, time).await?;
    }

    for notice in wizard.notices().iter().filter(|n| n.is_failure()) {
        tracing::warn!(?notice, "delivery failed during session");
    }

    Ok(SessionReport {
        step: wizard.step(),
        result: wizard.result(),
        scheduling: wizard.scheduling().cloned(),
        notices: wizard.notices().to_vec(),
        deliveries: Vec::new(),
    })
}
