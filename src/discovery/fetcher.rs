//! Page Fetcher
//!
//! Drives a paginated API action to completion.

use super::response::{
    parse_instances_response, parse_zones_response, AvailabilityZone, InstancesResponse,
    Reservation, ZonesResponse,
};
use crate::ec2::ApiTransport;
use crate::error::{DiscoveryError, ParseError};

/// A decoded page of a paginated action
pub trait Page: Sized {
    type Item;

    /// What the items are, for error messages
    const WHAT: &'static str;

    fn parse(data: &[u8]) -> Result<Self, ParseError>;

    /// Continuation token; empty on the last page
    fn next_page_token(&self) -> &str;

    fn into_items(self) -> Vec<Self::Item>;
}

impl Page for InstancesResponse {
    type Item = Reservation;
    const WHAT: &'static str = "instances";

    fn parse(data: &[u8]) -> Result<Self, ParseError> {
        parse_instances_response(data)
    }

    fn next_page_token(&self) -> &str {
        &self.next_page_token
    }

    fn into_items(self) -> Vec<Reservation> {
        self.reservations
    }
}

impl Page for ZonesResponse {
    type Item = AvailabilityZone;
    const WHAT: &'static str = "availability zones";

    fn parse(data: &[u8]) -> Result<Self, ParseError> {
        parse_zones_response(data)
    }

    fn next_page_token(&self) -> &str {
        &self.next_page_token
    }

    fn into_items(self) -> Vec<AvailabilityZone> {
        self.zones
    }
}

/// Fetch all pages of `action` (auto-paginate).
///
/// Pages are requested one at a time, each with the previous page's token.
/// The first failure aborts the whole fetch and drops what was collected.
pub async fn fetch_all_pages<P: Page>(
    transport: &dyn ApiTransport,
    action: &str,
) -> Result<Vec<P::Item>, DiscoveryError> {
    let mut all_items = Vec::new();
    let mut page_token = String::new();
    let mut pages = 0usize;

    loop {
        let data = transport
            .call(action, &page_token)
            .await
            .map_err(|source| DiscoveryError::Transport {
                what: P::WHAT,
                action: action.to_string(),
                source,
            })?;

        let page = P::parse(&data).map_err(|source| DiscoveryError::Parse {
            what: P::WHAT,
            source,
        })?;
        pages += 1;

        let next_token = page.next_page_token().to_string();
        all_items.extend(page.into_items());

        if next_token.is_empty() {
            break;
        }
        page_token = next_token;
    }

    tracing::debug!(
        "{}: fetched {} items in {} pages",
        action,
        all_items.len(),
        pages
    );
    Ok(all_items)
}
