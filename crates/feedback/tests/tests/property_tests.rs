#[path = "property/aggregation.rs"]
mod aggregation;

#[path = "property/classification.rs"]
mod classification;
