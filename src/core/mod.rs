pub mod advert;
pub mod listing;
pub mod search_response;

pub use advert::{Advert, SpicinessLevel};
pub use listing::AdvertCollection;
pub use search_response::{AdvertSource, ScoredAdvert, SearchResponse};
