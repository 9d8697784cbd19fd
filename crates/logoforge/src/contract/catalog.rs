//! Shape contracts for every structured capability.

use super::shape::{ObjectShape, Shape, ShapeContract};

pub const AVAILABILITY_OPTIONS: &[&str] = &["Available", "Premium", "Taken"];

pub fn bundle_metadata() -> ShapeContract {
    ShapeContract::object(
        ObjectShape::new()
            .required("title", Shape::String)
            .required("description", Shape::String)
            .required("price", Shape::Number)
            .required("seoTags", Shape::array_of(Shape::String))
            .required("brandVoiceScript", Shape::String)
            .required("blogArticle", Shape::String),
    )
}

pub fn ad_campaign() -> ShapeContract {
    ShapeContract::object(
        ObjectShape::new()
            .optional("headline", Shape::String)
            .optional("hook", Shape::String)
            .optional("cta", Shape::String)
            .optional("platform", Shape::String),
    )
}

pub fn social_calendar() -> ShapeContract {
    ShapeContract::array_of(
        ObjectShape::new()
            .optional("day", Shape::String)
            .optional("platform", Shape::String)
            .optional("content", Shape::String)
            .optional("visualHook", Shape::String),
    )
}

pub fn domain_scout() -> ShapeContract {
    ShapeContract::array_of(
        ObjectShape::new()
            .required("domain", Shape::String)
            .required("availabilitySim", Shape::OneOf(AVAILABILITY_OPTIONS))
            .required("reasoning", Shape::String),
    )
    .keyed_by("domain")
}

pub fn persona_audit() -> ShapeContract {
    ShapeContract::object(
        ObjectShape::new()
            .optional("demographic", Shape::String)
            .optional("psychographic", Shape::String)
            .optional("painPoints", Shape::array_of(Shape::String))
            .optional("brandingHook", Shape::String),
    )
}
