//! Console commands

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use gatepass_api::{decode_scan, QrPayload, RegistrationRequest, TransitionKind, VisitorPass};
use gatepass_client::ApiClient;
use gatepass_config::Settings;
use gatepass_core::{
    paginate, reconcile_scan, search, tally, today_registrations, view_all, ChartSlice,
    view, DashboardSummary, Page, PassView, ReportBuckets, ScanView, StatusCounts,
    TransitionService,
};
use gatepass_store::{AuditEvent, AuditEventType, SqliteStore, Store};
use gatepass_util::{PassId, ScanId, DATABASE_FILENAME};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a roster came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterSource {
    /// Fetched from the visitor API just now
    Live,
    /// Read from the local cache
    Cached,
}

/// Roster plus provenance
#[derive(Debug, Clone)]
pub struct Roster {
    pub passes: Vec<VisitorPass>,
    pub fetched_at: DateTime<Utc>,
    pub source: RosterSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub pass_count: usize,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListOutput {
    pub source: RosterSource,
    pub fetched_at: DateTime<Utc>,
    pub search: Option<String>,
    pub page: Page<PassView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportOutput {
    pub source: RosterSource,
    pub counts: StatusCounts,
    pub buckets: ReportBuckets,
    pub slices: Vec<ChartSlice>,
    /// Only known when the daily stats could be fetched
    pub today_registrations: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardOutput {
    pub source: RosterSource,
    #[serde(flatten)]
    pub summary: DashboardSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub scan_id: ScanId,
    #[serde(flatten)]
    pub view: ScanView,
}

/// A pass as handed to the visitor: its details, status and QR payload
#[derive(Debug, Clone, Serialize)]
pub struct PassCard {
    pub source: RosterSource,
    #[serde(flatten)]
    pub view: PassView,
    pub qr_payload: QrPayload,
    /// Text to encode into the QR image
    pub qr_text: String,
}

impl PassCard {
    pub fn new(source: RosterSource, view: PassView) -> Result<Self> {
        let qr_payload = QrPayload::from_pass(&view.pass);
        let qr_text = qr_payload.to_json()?;
        Ok(Self {
            source,
            view,
            qr_payload,
            qr_text,
        })
    }
}

/// Records to classify: a JSON array of passes or a single pass
#[derive(Deserialize)]
#[serde(untagged)]
enum PassFile {
    Many(Vec<VisitorPass>),
    One(Box<VisitorPass>),
}

/// Read pass records from a JSON file
pub fn read_pass_file(path: &Path) -> Result<Vec<VisitorPass>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    let parsed: PassFile = serde_json::from_str(&content)
        .with_context(|| format!("{:?} is not a pass record or a list of them", path))?;

    Ok(match parsed {
        PassFile::Many(passes) => passes,
        PassFile::One(pass) => vec![*pass],
    })
}

/// Classify records at `now`; needs neither the store nor the API
pub fn classify_passes(passes: &[VisitorPass], now: DateTime<Utc>) -> Vec<PassView> {
    view_all(passes, now)
}

/// Operator console state
pub struct Console {
    settings: Settings,
    store: Arc<dyn Store>,
    api: Option<ApiClient>,
    transitions: Option<Arc<dyn TransitionService>>,
}

impl Console {
    /// Open the store under the configured data directory and connect the API
    /// client if a base URL is configured.
    pub fn open(settings: Settings) -> Result<Self> {
        let data_dir = &settings.console.data_dir;
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

        let db_path = data_dir.join(DATABASE_FILENAME);
        let store: Arc<dyn Store> = Arc::new(
            SqliteStore::open(&db_path)
                .with_context(|| format!("Failed to open database {:?}", db_path))?,
        );
        info!(db_path = %db_path.display(), "Store initialized");

        let api = match &settings.api.base_url {
            Some(_) => Some(
                ApiClient::from_settings(&settings.api)
                    .context("Failed to build visitor API client")?,
            ),
            None => {
                debug!("No visitor API configured, only offline commands available");
                None
            }
        };

        Ok(Self::new(settings, store, api))
    }

    /// Assemble from parts. Scans go through the API client unless another
    /// service is supplied with [`Console::with_transition_service`].
    pub fn new(settings: Settings, store: Arc<dyn Store>, api: Option<ApiClient>) -> Self {
        let transitions = api
            .clone()
            .map(|client| Arc::new(client) as Arc<dyn TransitionService>);
        Self {
            settings,
            store,
            api,
            transitions,
        }
    }

    pub fn with_transition_service(mut self, service: Arc<dyn TransitionService>) -> Self {
        self.transitions = Some(service);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn record_start(&self) -> Result<()> {
        self.store
            .append_audit(AuditEvent::new(AuditEventType::ConsoleStarted))?;
        Ok(())
    }

    fn api(&self) -> Result<&ApiClient> {
        match &self.api {
            Some(api) => Ok(api),
            None => bail!("No visitor API configured; set [api] base_url, pass --api-url, or use --offline"),
        }
    }

    /// Best-effort audit append; a failing audit log never blocks the operator
    fn audit(&self, event: AuditEventType) {
        if let Err(e) = self.store.append_audit(AuditEvent::new(event)) {
            warn!(error = %e, "Failed to append audit event");
        }
    }

    /// Fetch the roster from the API and replace the cache with it
    pub async fn sync(&self) -> Result<SyncReport> {
        let (roster, cached) = self.fetch_and_cache().await?;
        Ok(SyncReport {
            pass_count: cached,
            fetched_at: roster.fetched_at,
        })
    }

    async fn fetch_live(&self) -> Result<Roster> {
        Ok(self.fetch_and_cache().await?.0)
    }

    /// Live roster plus the number of distinct passes now cached
    async fn fetch_and_cache(&self) -> Result<(Roster, usize)> {
        let passes = self
            .api()?
            .fetch_passes()
            .await
            .context("Failed to fetch visitor roster")?;
        let fetched_at = gatepass_util::now();

        let cached = self
            .store
            .replace_roster(&passes, fetched_at)
            .context("Failed to cache visitor roster")?;
        if cached != passes.len() {
            warn!(
                fetched = passes.len(),
                cached,
                "Roster contained repeated pass ids"
            );
        }
        self.audit(AuditEventType::RosterSynced { pass_count: cached });
        info!(pass_count = cached, "Roster synced");

        let roster = Roster {
            passes,
            fetched_at,
            source: RosterSource::Live,
        };
        Ok((roster, cached))
    }

    fn load_cached(&self) -> Result<Roster> {
        let snapshot = self
            .store
            .load_roster()
            .context("Failed to read cached roster")?;
        match snapshot {
            Some(snapshot) => Ok(Roster {
                passes: snapshot.passes,
                fetched_at: snapshot.fetched_at,
                source: RosterSource::Cached,
            }),
            None => bail!("No cached roster; run `gatepass sync` first"),
        }
    }

    /// Live roster, or the cache when `offline`
    pub async fn roster(&self, offline: bool) -> Result<Roster> {
        if offline {
            self.load_cached()
        } else {
            self.fetch_live().await
        }
    }

    pub async fn list(
        &self,
        term: Option<&str>,
        page: usize,
        offline: bool,
        now: DateTime<Utc>,
    ) -> Result<ListOutput> {
        let roster = self.roster(offline).await?;
        let matches: Vec<VisitorPass> = search(&roster.passes, term.unwrap_or(""))
            .into_iter()
            .cloned()
            .collect();
        let views = view_all(&matches, now);

        Ok(ListOutput {
            source: roster.source,
            fetched_at: roster.fetched_at,
            search: term.map(str::to_string),
            page: paginate(views, page, self.settings.listing.rows_per_page),
        })
    }

    pub async fn report(&self, offline: bool, now: DateTime<Utc>) -> Result<ReportOutput> {
        let roster = self.roster(offline).await?;
        let counts = tally(&roster.passes, now);
        let buckets = counts.buckets();

        let today_registrations = if offline {
            None
        } else {
            match self.api()?.fetch_daily_stats().await {
                Ok(stats) => Some(today_registrations(&stats, now.date_naive())),
                Err(e) => {
                    warn!(error = %e, "Failed to fetch daily stats");
                    None
                }
            }
        };

        Ok(ReportOutput {
            source: roster.source,
            counts,
            slices: buckets.chart_slices(),
            buckets,
            today_registrations,
        })
    }

    pub async fn dashboard(&self, offline: bool, now: DateTime<Utc>) -> Result<DashboardOutput> {
        let roster = self.roster(offline).await?;
        Ok(DashboardOutput {
            source: roster.source,
            summary: DashboardSummary::build(
                &roster.passes,
                now,
                self.settings.dashboard.recent_count,
            ),
        })
    }

    /// Decode scanned QR text, submit it, and reconcile the answer
    pub async fn scan(&self, raw: &str, now: DateTime<Utc>) -> Result<ScanOutcome> {
        let pass_id = match decode_scan(raw) {
            Ok(pass_id) => pass_id,
            Err(e) => {
                self.audit(AuditEventType::InvalidQr {
                    error: e.to_string(),
                });
                return Err(e).context("Could not read pass from scan");
            }
        };

        let service = match &self.transitions {
            Some(service) => service.clone(),
            None => bail!("No visitor API configured; scanning needs [api] base_url or --api-url"),
        };

        let scan_id = ScanId::new();
        self.audit(AuditEventType::ScanSubmitted {
            scan_id: scan_id.clone(),
            pass_id: pass_id.clone(),
        });

        let response = match service.scan(&pass_id).await {
            Ok(response) => response,
            Err(e) => {
                warn!(scan_id = %scan_id, pass_id = %pass_id, error = %e, retryable = e.is_retryable(), "Scan failed");
                self.audit(AuditEventType::ScanFailed {
                    scan_id: scan_id.clone(),
                    pass_id: pass_id.clone(),
                    error: e.to_string(),
                });
                let hint = if e.is_retryable() { "; try scanning again" } else { "" };
                return Err(e).with_context(|| format!("Scan of {} failed{}", pass_id, hint));
            }
        };

        if let Some(visitor) = &response.visitor {
            if let Err(e) = self.store.upsert_pass(visitor) {
                warn!(pass_id = %visitor.pass_id, error = %e, "Failed to cache scanned pass");
            }
        }

        let view = reconcile_scan(response, now);
        let audit_pass_id = view
            .pass
            .as_ref()
            .map(|p| p.pass.pass_id.clone())
            .unwrap_or_else(|| pass_id.clone());

        match (&view.kind, &view.pass) {
            (TransitionKind::Rejected, _) => self.audit(AuditEventType::ScanRejected {
                scan_id: scan_id.clone(),
                pass_id: audit_pass_id.clone(),
                message: view.message.clone().unwrap_or_default(),
            }),
            (kind, Some(pass)) => self.audit(AuditEventType::ScanAccepted {
                scan_id: scan_id.clone(),
                pass_id: audit_pass_id.clone(),
                kind: *kind,
                status: pass.status,
            }),
            // Accepted with no record; flagged below
            (_, None) => {}
        }

        if view.inconsistent {
            if let Some(pass) = &view.pass {
                self.audit(AuditEventType::ScanInconsistent {
                    scan_id: scan_id.clone(),
                    pass_id: audit_pass_id.clone(),
                    kind: view.kind,
                    reported_status: view.reported_status.clone(),
                    computed_status: pass.status,
                });
            } else {
                self.audit(AuditEventType::ScanRejected {
                    scan_id: scan_id.clone(),
                    pass_id: audit_pass_id.clone(),
                    message: "service accepted the scan but returned no record".into(),
                });
            }
        }

        info!(
            scan_id = %scan_id,
            pass_id = %audit_pass_id,
            kind = %view.kind,
            status = ?view.pass.as_ref().map(|p| p.status.label()),
            inconsistent = view.inconsistent,
            "Scan processed"
        );

        Ok(ScanOutcome { scan_id, view })
    }

    /// Register a visitor through the API and cache the created pass
    pub async fn register(
        &self,
        request: RegistrationRequest,
        now: DateTime<Utc>,
    ) -> Result<PassCard> {
        let request = request.prepare()?;
        let pass = self
            .api()?
            .register_pass(&request)
            .await
            .context("Failed to register visitor")?;

        if let Err(e) = self.store.upsert_pass(&pass) {
            warn!(pass_id = %pass.pass_id, error = %e, "Failed to cache registered pass");
        }
        self.audit(AuditEventType::PassRegistered {
            pass_id: pass.pass_id.clone(),
        });
        info!(pass_id = %pass.pass_id, visitor_type = pass.visitor_type.as_str(), "Visitor registered");

        PassCard::new(RosterSource::Live, view(&pass, now))
    }

    /// Look up one pass, from the live roster or the cache when `offline`
    pub async fn pass(
        &self,
        pass_id: &PassId,
        offline: bool,
        now: DateTime<Utc>,
    ) -> Result<PassCard> {
        let (found, source) = if offline {
            let cached = self
                .store
                .get_pass(pass_id)
                .context("Failed to read cached pass")?;
            (cached, RosterSource::Cached)
        } else {
            let roster = self.fetch_live().await?;
            // Last record wins, as in the cache
            let found = roster.passes.into_iter().rev().find(|p| &p.pass_id == pass_id);
            (found, RosterSource::Live)
        };

        match found {
            Some(pass) => PassCard::new(source, view(&pass, now)),
            None => bail!("No pass with id {}", pass_id),
        }
    }

    pub fn audit_log(&self, limit: usize) -> Result<Vec<AuditEvent>> {
        Ok(self.store.get_recent_audits(limit)?)
    }
}
