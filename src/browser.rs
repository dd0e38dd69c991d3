// Home page listing browser
use std::sync::Arc;
use tracing::{debug, error};

use crate::api::ApiClient;
use crate::booking::BookingViewModel;
use crate::listing::{Listing, ListingId};
use crate::pricing::PricingStrategy;
use crate::session::SessionContext;

pub const LOAD_FAILED: &str = "Failed to load properties";

#[derive(Debug, Clone, PartialEq)]
pub enum ListingsState {
    Loading,
    Ready(Vec<Listing>),
    Failed(String),
}

// What a card on the home page shows and where it links to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingCard {
    pub id: Option<ListingId>,
    pub title: String,
    pub price_label: String,
    pub image: Option<String>,
    pub route: String,
}

impl From<&Listing> for ListingCard {
    fn from(listing: &Listing) -> Self {
        ListingCard {
            id: listing.id,
            title: listing.title.clone(),
            price_label: listing.display_price(),
            image: listing.cover_image().map(str::to_string),
            route: listing.booking_route(),
        }
    }
}

pub struct ListingBrowser {
    api: Arc<dyn ApiClient>,
    state: ListingsState,
}

impl ListingBrowser {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            state: ListingsState::Loading,
        }
    }

    pub fn state(&self) -> &ListingsState {
        &self.state
    }

    /// Fetches every package once. A failure stays visible until a new
    /// browser is created; there is no retry.
    pub async fn load(&mut self) -> &ListingsState {
        if self.state != ListingsState::Loading {
            return &self.state;
        }

        self.state = match self.api.list_packages().await {
            Ok(listings) => {
                debug!(count = listings.len(), "Listings loaded");
                ListingsState::Ready(listings)
            }
            Err(e) => {
                error!(error = %e, "Error fetching properties");
                ListingsState::Failed(LOAD_FAILED.to_string())
            }
        };
        &self.state
    }

    pub fn listings(&self) -> &[Listing] {
        match &self.state {
            ListingsState::Ready(listings) => listings,
            _ => &[],
        }
    }

    pub fn cards(&self) -> Vec<ListingCard> {
        self.listings().iter().map(ListingCard::from).collect()
    }

    pub fn find(&self, id: ListingId) -> Option<&Listing> {
        self.listings().iter().find(|l| l.id == Some(id))
    }

    // Navigating to the booking page hands over a copy of the listing; the
    // booking page never re-fetches it.
    pub fn select(
        &self,
        id: ListingId,
        session: SessionContext,
        strategy: PricingStrategy,
    ) -> Option<BookingViewModel> {
        let listing = self.find(id)?.clone();
        Some(BookingViewModel::new(
            listing,
            self.api.clone(),
            session,
            strategy,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock_server::{MockServer, Route};

    fn packages() -> Vec<Listing> {
        vec![
            Listing {
                id: Some(1),
                owner_id: Some(10),
                owner_name: "Bali".to_string(),
                title: "Bali Escape".to_string(),
                price: "2499".to_string(),
                images: vec!["bali.png".to_string()],
                ..Listing::default()
            },
            Listing {
                id: Some(2),
                owner_id: Some(11),
                owner_name: "Dubai".to_string(),
                title: "Desert Luxury".to_string(),
                price: "$ 1,999".to_string(),
                ..Listing::default()
            },
        ]
    }

    #[tokio::test]
    async fn test_load_exposes_cards() {
        let server = Arc::new(MockServer::new());
        server.set_packages(packages());
        let mut browser = ListingBrowser::new(server.clone());
        assert_eq!(browser.state(), &ListingsState::Loading);

        browser.load().await;

        let cards = browser.cards();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].price_label, "Rs. 2499");
        assert_eq!(cards[0].image.as_deref(), Some("bali.png"));
        assert_eq!(cards[0].route, "/booking/Bali");
        assert_eq!(cards[1].price_label, "$ 1,999");
        assert_eq!(cards[1].image, None);
    }

    #[tokio::test]
    async fn test_failure_is_permanent() {
        let server = Arc::new(MockServer::new());
        server.respond_with(Route::Packages, 500, "<h1>down</h1>");
        let mut browser = ListingBrowser::new(server.clone());

        assert_eq!(
            browser.load().await,
            &ListingsState::Failed(LOAD_FAILED.to_string())
        );
        browser.load().await;

        assert_eq!(server.calls_to(Route::Packages), 1);
        assert!(browser.cards().is_empty());
    }

    #[tokio::test]
    async fn test_select_hands_listing_to_booking_page() {
        let server = Arc::new(MockServer::new());
        server.set_packages(packages());
        let mut browser = ListingBrowser::new(server.clone());
        browser.load().await;

        let vm = browser
            .select(2, SessionContext::anonymous(), PricingStrategy::PerNight)
            .unwrap();
        assert_eq!(vm.listing().title, "Desert Luxury");
        assert_eq!(vm.strategy(), PricingStrategy::PerNight);
        assert!(browser
            .select(99, SessionContext::anonymous(), PricingStrategy::PerNight)
            .is_none());
        assert_eq!(server.calls_to(Route::Packages), 1);
    }
}
