pub mod author;
pub mod rating;
pub mod row;
pub mod work;

pub use author::{AuthorCache, AuthorLookup, AuthorRecord};
pub use rating::{RatingCache, RatingLookup, RatingRecord};
pub use row::{join_rows, EnrichedRow, NOT_AVAILABLE};
pub use work::WorkRecord;
