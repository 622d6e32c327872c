use serde::Serialize;

pub const AFFORDABLE_MESSAGE: &str = "This quote uses our affordable pricing model, designed for \
     South African businesses. Prices are 60% lower than our previous rates.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PriceRange {
    pub min: u32,
    pub max: u32,
}

/// A reference project shown to prospects before they request an estimate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PriceGuideEntry {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub price_range: PriceRange,
    pub timeline: &'static str,
    pub features: &'static [&'static str],
}

const PRICE_GUIDE: &[PriceGuideEntry] = &[
    PriceGuideEntry {
        kind: "simple_website",
        name: "Simple Website",
        description: "Basic landing page or portfolio website",
        price_range: PriceRange { min: 5_000, max: 15_000 },
        timeline: "2-3 weeks",
        features: &["Responsive design", "Contact form", "SEO basic"],
    },
    PriceGuideEntry {
        kind: "ecommerce_basic",
        name: "Basic E-commerce Store",
        description: "Online store with essential features",
        price_range: PriceRange { min: 15_000, max: 40_000 },
        timeline: "4-6 weeks",
        features: &["Product catalog", "Payment integration", "Order management"],
    },
    PriceGuideEntry {
        kind: "mobile_app",
        name: "Mobile Application",
        description: "Cross-platform mobile app",
        price_range: PriceRange { min: 20_000, max: 50_000 },
        timeline: "6-8 weeks",
        features: &["iOS & Android", "Backend API", "App store deployment"],
    },
    PriceGuideEntry {
        kind: "business_software",
        name: "Business Management Software",
        description: "Custom business solution",
        price_range: PriceRange { min: 25_000, max: 80_000 },
        timeline: "8-12 weeks",
        features: &["Custom features", "User management", "Reporting"],
    },
];

pub fn price_guide() -> &'static [PriceGuideEntry] {
    PRICE_GUIDE
}
