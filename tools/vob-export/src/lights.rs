//! Named-light catalog
//!
//! Static table mapping a light name to its classification and the
//! dataref the player animates it with. Must be kept in sync with the
//! player's light table. "Custom" lights are individually addressable
//! (one instruction each); everything else is bulk-coalesced.

use crate::error::CompileError;

pub struct NamedLightInfo {
    pub name: &'static str,
    pub custom: bool,
    pub dataref: &'static str,
}

const fn custom(name: &'static str, dataref: &'static str) -> NamedLightInfo {
    NamedLightInfo {
        name,
        custom: true,
        dataref,
    }
}

const fn bulk(name: &'static str, dataref: &'static str) -> NamedLightInfo {
    NamedLightInfo {
        name,
        custom: false,
        dataref,
    }
}

pub const NAMED_LIGHTS: &[NamedLightInfo] = &[
    custom("airplane_landing", "anim/lights/airplane_landing"),
    custom("airplane_nav_left", "anim/lights/airplane_nav_left"),
    custom("airplane_nav_right", "anim/lights/airplane_nav_right"),
    custom("airplane_nav_tail", "anim/lights/airplane_nav_tail"),
    // Old names - for compatibility.
    custom("airplane_nav_l", "anim/lights/airplane_nav_left"),
    custom("airplane_nav_r", "anim/lights/airplane_nav_right"),
    custom("airplane_nav_t", "anim/lights/airplane_nav_tail"),
    custom("airplane_strobe", "anim/lights/airplane_strobe"),
    custom("airplane_beacon", "anim/lights/airplane_beacon"),
    custom("rwy_papi_1", "anim/lights/rwy_papi_1"),
    custom("rwy_papi_2", "anim/lights/rwy_papi_2"),
    custom("rwy_papi_3", "anim/lights/rwy_papi_3"),
    custom("rwy_papi_4", "anim/lights/rwy_papi_4"),
    custom("rwy_papi_rev_1", "anim/lights/rwy_papi_rev_1"),
    custom("rwy_papi_rev_2", "anim/lights/rwy_papi_rev_2"),
    custom("rwy_papi_rev_3", "anim/lights/rwy_papi_rev_3"),
    custom("rwy_papi_rev_4", "anim/lights/rwy_papi_rev_4"),
    bulk("rwy_ww", "anim/lights/runway_ww"),
    bulk("rwy_wy", "anim/lights/runway_wy"),
    bulk("rwy_yw", "anim/lights/runway_yw"),
    bulk("rwy_yy", "anim/lights/runway_yy"),
    bulk("rwy_gr", "anim/lights/runway_gr"),
    bulk("rwy_rg", "anim/lights/runway_rg"),
    bulk("rwy_xw", "anim/lights/runway_xw"),
    bulk("rwy_xr", "anim/lights/runway_xr"),
    bulk("rwy_wx", "anim/lights/runway_wx"),
    bulk("rwy_rx", "anim/lights/runway_rx"),
    bulk("taxi_b", "anim/lights/taxi_b"),
    bulk("carrier_center_white", "anim/lights/carrier_center_white"),
    bulk("carrier_deck_blue_e", "anim/lights/carrier_deck_blue_e"),
    bulk("carrier_deck_blue_n", "anim/lights/carrier_deck_blue_n"),
    bulk("carrier_deck_blue_s", "anim/lights/carrier_deck_blue_s"),
    bulk("carrier_deck_blue_w", "anim/lights/carrier_deck_blue_w"),
    bulk("carrier_edge_white", "anim/lights/carrier_edge_white"),
    bulk("carrier_foul_line_red", "anim/lights/carrier_foul_line_red"),
    bulk("carrier_foul_line_white", "anim/lights/carrier_foul_line_white"),
    bulk("carrier_thresh_white", "anim/lights/carrier_thresh_white"),
    bulk("ship_nav_left", "anim/lights/ship_nav_left"),
    bulk("ship_nav_right", "anim/lights/ship_nav_right"),
    bulk("ship_nav_tail", "anim/lights/ship_nav_tail"),
    bulk("ship_mast_obs", "anim/lights/ship_mast_obs"),
    bulk("ship_mast_powered", "anim/lights/ship_mast_powered"),
    bulk("carrier_mast_strobe", "anim/lights/carrier_mast_strobe"),
    bulk("carrier_pitch_lights", "anim/lights/carrier_pitch_lights"),
    custom("carrier_datum", "anim/lights/carrier_datum"),
    custom("carrier_meatball1", "anim/lights/carrier_meatball1"),
    custom("carrier_meatball2", "anim/lights/carrier_meatball2"),
    custom("carrier_meatball3", "anim/lights/carrier_meatball3"),
    custom("carrier_meatball4", "anim/lights/carrier_meatball4"),
    custom("carrier_meatball5", "anim/lights/carrier_meatball5"),
    custom("carrier_waveoff", "anim/lights/carrier_waveoff"),
];

/// Look up a light by name; unknown names fail the compile
pub fn light_info(name: &str) -> Result<&'static NamedLightInfo, CompileError> {
    NAMED_LIGHTS
        .iter()
        .find(|info| info.name == name)
        .ok_or_else(|| CompileError::UnknownLight(name.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_and_bulk_classification() {
        assert!(light_info("airplane_beacon").unwrap().custom);
        assert!(!light_info("rwy_ww").unwrap().custom);
        assert!(!light_info("taxi_b").unwrap().custom);
    }

    #[test]
    fn test_compat_aliases_share_datarefs() {
        assert_eq!(
            light_info("airplane_nav_l").unwrap().dataref,
            light_info("airplane_nav_left").unwrap().dataref
        );
    }

    #[test]
    fn test_unknown_light_fails() {
        assert!(matches!(
            light_info("disco_ball"),
            Err(CompileError::UnknownLight(_))
        ));
    }
}
