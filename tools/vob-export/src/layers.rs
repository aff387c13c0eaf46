//! Draw-order layer bands
//!
//! The player sorts objects by a single integer layer index. Named bands
//! own reserved numeric ranges; a layer-group command selects a band and
//! an offset within it. Offsets are taken as given, not clamped - staying
//! inside a band's width is the caller's job.

/// Band used when the object never states one ("objects")
pub const DEFAULT_LAYER_GROUP: i32 = 1950;

/// Map a band name and offset to the layer index.
///
/// Bands that draw both under and over the runway surface split on the
/// sign of the offset. Unknown names return `None`.
pub fn layer_group_index(name: &str, offset: i32) -> Option<i32> {
    let base = match name {
        "terrain" => 5,
        "beaches" => 25,
        "shoulders" if offset < 0 => 70,
        "shoulders" => 90,
        "taxiways" if offset < 0 => 100,
        "taxiways" => 1000,
        "runways" if offset < 0 => 1100,
        "runways" => 1900,
        "markings" => 1920,
        "airports" if offset < 0 => 60,
        "airports" => 1930,
        "roads" => 1940,
        "objects" => 1950,
        "light_objects" => 1955,
        "cars" => 1960,
        _ => return None,
    };
    Some(base + offset)
}
