//! Check command - sequential connectivity probes against a running server

use std::time::{Duration, Instant};

use clap::Args;
use reqwest::{Client, Method, StatusCode};
use serde_json::json;
use tracing::{info, warn};

use crate::config::LoggingConfig;
use crate::infrastructure::logging;

#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    /// Base URL of the server to probe
    #[arg(long, default_value = "http://localhost:5000")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout: u64,
}

/// Result of a single probe
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub name: &'static str,
    pub url: String,
    pub status: Option<StatusCode>,
    pub expected: &'static [StatusCode],
    pub elapsed: Duration,
    pub error: Option<String>,
}

impl ProbeOutcome {
    /// The server answered at all
    pub fn reachable(&self) -> bool {
        self.status.is_some()
    }

    /// The server answered with one of the expected statuses
    pub fn passed(&self) -> bool {
        self.status.is_some_and(|s| self.expected.contains(&s))
    }

    fn line(&self) -> String {
        let verdict = if self.passed() {
            "ok"
        } else if self.reachable() {
            "unexpected"
        } else {
            "unreachable"
        };

        match (&self.status, &self.error) {
            (Some(status), _) => format!(
                "[{}] {} {} -> {} ({} ms)",
                verdict,
                self.name,
                self.url,
                status,
                self.elapsed.as_millis()
            ),
            (None, Some(error)) => format!("[{}] {} {} -> {}", verdict, self.name, self.url, error),
            (None, None) => format!("[{}] {} {}", verdict, self.name, self.url),
        }
    }
}

struct Probe {
    name: &'static str,
    method: Method,
    path: &'static str,
    body: Option<serde_json::Value>,
    expected: &'static [StatusCode],
}

fn probes() -> Vec<Probe> {
    vec![
        Probe {
            name: "health",
            method: Method::GET,
            path: "/health",
            body: None,
            expected: &[StatusCode::OK],
        },
        Probe {
            name: "login (bogus credentials)",
            method: Method::POST,
            path: "/api/auth/login",
            body: Some(json!({ "email": "probe@invalid.test", "password": "not-a-password" })),
            expected: &[StatusCode::UNAUTHORIZED],
        },
        Probe {
            name: "prescriptions",
            method: Method::GET,
            path: "/api/prescriptions",
            body: None,
            expected: &[StatusCode::OK, StatusCode::UNAUTHORIZED],
        },
    ]
}

/// Run every probe in order, log a report, and fail if the server never answered
pub async fn run(args: CheckArgs) -> anyhow::Result<()> {
    logging::init_logging(&LoggingConfig::default());

    let outcomes = run_probes(&args).await?;

    for outcome in &outcomes {
        if outcome.passed() {
            info!(probe = outcome.name, "{}", outcome.line());
        } else {
            warn!(probe = outcome.name, "{}", outcome.line());
        }
    }

    let passed = outcomes.iter().filter(|o| o.passed()).count();
    info!(base_url = %args.base_url, "{}/{} probes passed", passed, outcomes.len());

    if !outcomes.iter().any(ProbeOutcome::reachable) {
        anyhow::bail!("Server at {} is unreachable", args.base_url);
    }

    Ok(())
}

pub async fn run_probes(args: &CheckArgs) -> anyhow::Result<Vec<ProbeOutcome>> {
    let client = Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;
    let base = args.base_url.trim_end_matches('/');

    let mut outcomes = Vec::new();
    for probe in probes() {
        outcomes.push(execute(&client, base, probe).await);
    }

    Ok(outcomes)
}

async fn execute(client: &Client, base: &str, probe: Probe) -> ProbeOutcome {
    let url = format!("{}{}", base, probe.path);
    let mut request = client.request(probe.method, &url);
    if let Some(body) = &probe.body {
        request = request.json(body);
    }

    let start = Instant::now();
    let result = request.send().await;
    let elapsed = start.elapsed();

    match result {
        Ok(response) => ProbeOutcome {
            name: probe.name,
            url,
            status: Some(response.status()),
            expected: probe.expected,
            elapsed,
            error: None,
        },
        Err(e) => ProbeOutcome {
            name: probe.name,
            url,
            status: None,
            expected: probe.expected,
            elapsed,
            error: Some(e.to_string()),
        },
    }
}
