//! Terminal rendering of analysis snapshots.
//!
//! Sections are printed as soon as their stage concludes, once each.

use std::fmt::Write as _;

use colored::*;

use crate::audit::seo_checks;
use crate::models::{AnalysisResult, PsiDeviceData};
use crate::pipeline::AnalysisSnapshot;

fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

/// Metadata, server details, and the checklist.
pub fn render_core(result: &AnalysisResult) -> String {
    let meta = &result.meta_data;
    let server = &result.server_details;
    let mut out = String::new();

    let _ = writeln!(out, "{} {}", "Analysis for".bold(), result.url.cyan());
    let _ = writeln!(out, "\n{}", "Metadata".bold().underline());
    let _ = writeln!(out, "  Title:       {}", meta.title);
    let _ = writeln!(out, "  Description: {}", or_dash(Some(meta.description.as_str())));
    let _ = writeln!(out, "  Canonical:   {}", or_dash(meta.canonical.as_deref()));
    let _ = writeln!(out, "  Favicon:     {}", or_dash(meta.favicon.as_deref()));
    let _ = writeln!(out, "  Headings:    {} ({} h1)", meta.headings.len(), meta.h1_count());
    let _ = writeln!(out, "  robots.txt:  {}", meta.robots_txt_status.as_str());

    let _ = writeln!(out, "\n{}", "Server & Hosting".bold().underline());
    let _ = writeln!(out, "  IPv4:        {}", or_dash(server.ip_address.as_deref()));
    let _ = writeln!(out, "  IPv6:        {}", or_dash(server.ipv6_address.as_deref()));
    let _ = writeln!(out, "  Provider:    {}", or_dash(server.hosting_provider.as_deref()));
    if let Some(details) = &server.ip_details {
        let location = [&details.city, &details.region, &details.country]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        let asn = details.asn.map(|asn| format!("AS{asn}"));
        let _ = writeln!(out, "  Location:    {}", or_dash(Some(location.as_str())));
        let _ = writeln!(out, "  ASN:         {}", or_dash(asn.as_deref()));
        let _ = writeln!(out, "  Timezone:    {}", or_dash(details.timezone.as_deref()));
    }
    let _ = writeln!(out, "  CDN:         {}", or_dash(server.cdn_provider.as_deref()));
    let _ = writeln!(out, "  Server:      {}", or_dash(server.server_signature.as_deref()));
    let _ = writeln!(out, "  SSL:         {}", if server.ssl_enabled { "yes" } else { "no" });
    let _ = writeln!(out, "  HSTS:        {}", if server.is_hsts_enabled { "yes" } else { "no" });
    for (name, value) in &server.other_headers {
        let _ = writeln!(out, "  {name}: {value}");
    }

    let _ = writeln!(out, "\n{}", "SEO Checklist".bold().underline());
    for check in seo_checks(meta) {
        let mark = if check.is_ok { "✔".green() } else { "✘".red() };
        let _ = writeln!(
            out,
            "  {} {:<18} {:<12} {}",
            mark,
            check.name,
            check.status,
            check.advice()
        );
    }
    out
}

fn render_device(out: &mut String, label: &str, device: Option<&PsiDeviceData>) {
    let Some(device) = device else {
        let _ = writeln!(out, "  {label}: {}", "unavailable".yellow());
        return;
    };
    let score = device.score.to_string();
    let score = match device.score {
        90..=100 => score.green(),
        50..=89 => score.yellow(),
        _ => score.red(),
    };
    let _ = writeln!(out, "  {label}: {score}/100");
    for metric in &device.metrics {
        let _ = writeln!(out, "    {:<32} {}", metric.title, metric.display_value);
    }
}

/// Performance scores, or the stage's error.
pub fn render_performance(result: &AnalysisResult) -> String {
    let mut out = format!("\n{}\n", "Performance".bold().underline());
    match (&result.psi_data, &result.psi_error) {
        (Some(psi), _) => {
            render_device(&mut out, "Mobile", psi.mobile.as_ref());
            render_device(&mut out, "Desktop", psi.desktop.as_ref());
        }
        (None, Some(error)) => {
            let _ = writeln!(out, "  {}", error.red());
        }
        (None, None) => {}
    }
    out
}

/// Suggestions text, or the stage's error.
pub fn render_suggestions(result: &AnalysisResult) -> String {
    let mut out = format!("\n{}\n", "AI Suggestions".bold().underline());
    match (&result.seo_suggestions, &result.suggestions_error) {
        (Some(text), _) => {
            let _ = writeln!(out, "{}", text.trim_end());
        }
        (None, Some(error)) => {
            let _ = writeln!(out, "  {}", error.red());
        }
        (None, None) => {}
    }
    out
}

/// Prints each section of a run once, as soon as it is available.
#[derive(Debug, Default)]
pub struct ProgressPrinter {
    run_id: u64,
    core_shown: bool,
    performance_shown: bool,
    suggestions_shown: bool,
}

impl ProgressPrinter {
    /// Returns the sections of `snapshot` not printed yet.
    pub fn update(&mut self, snapshot: &AnalysisSnapshot) -> String {
        if snapshot.run_id != self.run_id {
            *self = ProgressPrinter {
                run_id: snapshot.run_id,
                ..Default::default()
            };
        }
        let mut out = String::new();
        if let Some(error) = &snapshot.state.fatal_error {
            if !self.core_shown {
                self.core_shown = true;
                let _ = writeln!(out, "{} {}", "Analysis failed:".red().bold(), error);
            }
            return out;
        }
        let Some(result) = &snapshot.result else {
            return out;
        };

        if !self.core_shown {
            self.core_shown = true;
            out.push_str(&render_core(result));
        }
        if !self.performance_shown && (result.psi_data.is_some() || result.psi_error.is_some()) {
            self.performance_shown = true;
            out.push_str(&render_performance(result));
        }
        if !self.suggestions_shown && (result.seo_suggestions.is_some() || result.suggestions_error.is_some()) {
            self.suggestions_shown = true;
            out.push_str(&render_suggestions(result));
        }
        out
    }
}

/// Tracks how much of a streaming chat turn has been printed.
#[derive(Debug, Default)]
pub struct TurnPrinter {
    shown: String,
}

impl TurnPrinter {
    /// Starts over for a new turn.
    pub fn reset(&mut self) {
        self.shown.clear();
    }

    /// Text to print so the terminal matches `content`.
    ///
    /// Growth prints the new suffix; a replaced turn (a failed reply) is
    /// printed again in full on a new line.
    pub fn delta(&mut self, content: &str) -> Option<String> {
        if content == self.shown {
            return None;
        }
        let out = match content.strip_prefix(self.shown.as_str()) {
            Some(suffix) => suffix.to_string(),
            None => format!("\n{content}"),
        };
        self.shown = content.to_string();
        Some(out)
    }
}
