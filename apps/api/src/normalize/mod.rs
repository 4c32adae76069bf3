// Listing text normalization: price parsing, inline price markers, and the
// additional-info checklist. Pure, synchronous, no I/O.

pub mod additional_info;
pub mod attributes;
pub mod korean_price;
pub mod price_extractor;
