//! robots.txt retrieval.

use url::Url;

use crate::gateway::ContentGateway;
use crate::models::{RobotsTxt, RobotsTxtStatus};

/// Fetches `/robots.txt` from the page's origin.
///
/// Never fails: a non-success status yields `NotFound`, a transport failure
/// (or an unparseable page URL) yields `Error`, and both leave the content empty.
pub async fn fetch_robots_txt(gateway: &dyn ContentGateway, page_url: &str) -> RobotsTxt {
    let robots_url = match Url::parse(page_url).and_then(|u| u.join("/robots.txt")) {
        Ok(u) => u,
        Err(e) => {
            log::warn!("Could not build robots.txt URL for {}: {}", page_url, e);
            return RobotsTxt {
                content: None,
                status: RobotsTxtStatus::Error,
            };
        }
    };

    match gateway.fetch(robots_url.as_str()).await {
        Ok(response) if response.status.is_success() => RobotsTxt {
            content: Some(response.body),
            status: RobotsTxtStatus::Found,
        },
        Ok(response) => {
            log::debug!("robots.txt for {} returned {}", page_url, response.status);
            RobotsTxt {
                content: None,
                status: RobotsTxtStatus::NotFound,
            }
        }
        Err(e) => {
            log::warn!("Could not fetch robots.txt for {}: {}", page_url, e);
            RobotsTxt {
                content: None,
                status: RobotsTxtStatus::Error,
            }
        }
    }
}
