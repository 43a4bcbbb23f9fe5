//! National park sites in New York state, used as trip stops.
//!
//! Coordinates are approximate; addresses only need to be realistic enough
//! for the locality filter to tell city sites from upstate ones.

/// A named site with coordinates and a formatted address.
#[derive(Debug, Clone)]
pub struct Site {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
    pub address: &'static str,
}

impl Site {
    pub const fn new(name: &'static str, lat: f64, lng: f64, address: &'static str) -> Self {
        Self {
            name,
            lat,
            lng,
            address,
        }
    }
}

pub const PENN_STATION: Site = Site::new(
    "New York Penn Station",
    40.7506,
    -73.9935,
    "New York Penn Station, New York, NY 10001, USA",
);

// ============================================================================
// Sites inside New York City
// ============================================================================

pub const CITY_SITES: &[Site] = &[
    Site::new("African Burial Ground NM", 40.7143, -74.0042, "290 Broadway, New York, NY 10007, USA"),
    Site::new("Castle Clinton NM", 40.7034, -74.0169, "Battery Park, New York, NY 10004, USA"),
    Site::new("Federal Hall N MEM", 40.7073, -74.0102, "26 Wall St, New York, NY 10005, USA"),
    Site::new("General Grant N MEM", 40.8134, -73.9630, "W 122nd St & Riverside Dr, New York, NY 10027, USA"),
    Site::new("Governors Island NM", 40.6895, -74.0168, "Governors Island, New York, NY 10004, USA"),
    Site::new("Hamilton Grange N MEM", 40.8213, -73.9474, "414 W 141st St, New York, NY 10031, USA"),
    Site::new("Lower East Side Tenement Museum NHS", 40.7188, -73.9900, "103 Orchard St, New York, NY 10002, USA"),
    Site::new("National Parks of New York Harbor", 40.6892, -74.0445, "Liberty Island, New York, NY 10004, USA"),
    Site::new("Stonewall NM", 40.7338, -74.0020, "Christopher Park, New York, NY 10014, USA"),
    Site::new("Theodore Roosevelt Birthplace NHS", 40.7388, -73.9895, "28 E 20th St, New York, NY 10003, USA"),
    Site::new("Gateway NRA", 40.5754, -73.8886, "Floyd Bennett Field, Brooklyn, New York, NY 11234, USA"),
];

// ============================================================================
// Sites elsewhere in the state (dropped by a "New York, NY" locality)
// ============================================================================

pub const UPSTATE_SITES: &[Site] = &[
    Site::new("Eleanor Roosevelt NHS", 41.7637, -73.8990, "54 Valkill Park Rd, Hyde Park, NY 12538, USA"),
    Site::new("Fire Island NS", 40.6473, -73.1442, "120 Laurel St, Patchogue, NY 11772, USA"),
    Site::new("Fort Stanwix NM", 43.2104, -75.4557, "100 N James St, Rome, NY 13440, USA"),
    Site::new("Harriet Tubman National Historical Park", 42.9073, -76.5640, "180 South St, Auburn, NY 13021, USA"),
    Site::new("Home of Franklin D. Roosevelt NHS", 41.7675, -73.9350, "4097 Albany Post Rd, Hyde Park, NY 12538, USA"),
    Site::new("Martin Van Buren NHS", 42.3690, -73.7046, "1013 Old Post Rd, Kinderhook, NY 12106, USA"),
    Site::new("Sagamore Hill NHS", 40.8854, -73.4979, "20 Sagamore Hill Rd, Oyster Bay, NY 11771, USA"),
    Site::new("Saratoga NHP", 43.0121, -73.6487, "648 NY-32, Stillwater, NY 12170, USA"),
    Site::new("Thomas Cole NHS", 42.2253, -73.8617, "218 Spring St, Catskill, NY 12414, USA"),
    Site::new("Vanderbilt Mansion NHS", 41.7959, -73.9418, "119 Vanderbilt Park Rd, Hyde Park, NY 12538, USA"),
];

/// Every site name, city and upstate interleaved as a user might list them.
pub fn all_site_names() -> Vec<&'static str> {
    let mut names = Vec::new();
    let mut city = CITY_SITES.iter();
    let mut upstate = UPSTATE_SITES.iter();
    loop {
        match (city.next(), upstate.next()) {
            (None, None) => break,
            (c, u) => {
                names.extend(c.map(|site| site.name));
                names.extend(u.map(|site| site.name));
            }
        }
    }
    names
}

/// `count` synthetic city sites laid out on a grid around midtown.
pub fn grid_sites(count: usize) -> Vec<(String, f64, f64)> {
    (0..count)
        .map(|i| {
            let row = (i / 6) as f64;
            let column = (i % 6) as f64;
            (
                format!("Grid Site {i:02}"),
                40.70 + row * 0.011,
                -74.02 + column * 0.009,
            )
        })
        .collect()
}
