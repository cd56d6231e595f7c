// Static index of Vietnam's six geographic regions.
//
// The six lists partition all 63 provinces: every province appears in
// exactly one list. Lookups go through a precomputed reverse map; because
// the lists are disjoint, "first containing region wins" is deterministic.
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const REGIONS: [(&str, &[&str]); 6] = [
    (
        "Red River Delta",
        &[
            "Ha Noi", "Vinh Phuc", "Bac Ninh", "Quang Ninh", "Hai Duong", "Hai Phong", "Hung Yen",
            "Thai Binh", "Ha Nam", "Nam Dinh", "Ninh Binh",
        ],
    ),
    (
        "Northern Midlands and Mountainous Region",
        &[
            "Ha Giang", "Cao Bang", "Bac Kan", "Tuyen Quang", "Lao Cai", "Yen Bai", "Thai Nguyen",
            "Lang Son", "Bac Giang", "Phu Tho", "Dien Bien", "Lai Chau", "Son La", "Hoa Binh",
        ],
    ),
    (
        "North Central and Central Coastal Region",
        &[
            "Thanh Hoa", "Nghe An", "Ha Tinh", "Quang Binh", "Quang Tri", "Thua Thien Hue",
            "Da Nang", "Quang Nam", "Quang Ngai", "Binh Dinh", "Phu Yen", "Khanh Hoa",
            "Ninh Thuan", "Binh Thuan",
        ],
    ),
    (
        "Central Highlands",
        &["Kon Tum", "Gia Lai", "Dak Lak", "Dak Nong", "Lam Dong"],
    ),
    (
        "Southeast",
        &[
            "Binh Phuoc", "Tay Ninh", "Binh Duong", "Dong Nai", "Ba Ria - Vung Tau", "Ho Chi Minh",
        ],
    ),
    (
        "Mekong Delta",
        &[
            "Long An", "Tien Giang", "Ben Tre", "Tra Vinh", "Vinh Long", "Dong Thap", "An Giang",
            "Kien Giang", "Can Tho", "Hau Giang", "Soc Trang", "Bac Lieu", "Ca Mau",
        ],
    ),
];

static REGION_OF: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (region, provinces) in REGIONS {
        for p in provinces {
            // First containing region wins.
            map.entry(*p).or_insert(region);
        }
    }
    map
});

/// Region containing `province`, or `None` for provinces outside the six
/// lists (the map renders those with a plain tooltip instead of a chart).
pub fn region_of(province: &str) -> Option<&'static str> {
    REGION_OF.get(province.trim()).copied()
}

/// Member provinces of a named region, in display order.
pub fn provinces_of(region: &str) -> &'static [&'static str] {
    REGIONS
        .iter()
        .find(|(name, _)| *name == region)
        .map(|(_, provinces)| *provinces)
        .unwrap_or(&[])
}

/// All 63 provinces flattened in region order.
pub fn all_provinces() -> Vec<&'static str> {
    REGIONS
        .iter()
        .flat_map(|(_, provinces)| provinces.iter().copied())
        .collect()
}
