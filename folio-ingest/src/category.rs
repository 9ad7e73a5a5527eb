//! Keyword buckets for spending categories.
//!
//! Matching is case-insensitive on whole words. Buckets are tried in
//! declaration order, so a line mentioning both "Grocery" and "shopping"
//! reports the Food/Dining match.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CategoryBucket {
    #[serde(rename = "food-dining")]
    FoodDining,
    #[serde(rename = "transport")]
    Transport,
    #[serde(rename = "shopping")]
    Shopping,
    #[serde(rename = "entertainment")]
    Entertainment,
    #[serde(rename = "utility-bill")]
    UtilityBill,
    #[serde(rename = "health-medical")]
    HealthMedical,
    #[serde(rename = "home-housing")]
    HomeHousing,
}

impl CategoryBucket {
    /// Every bucket, in match priority order.
    pub const ALL: [CategoryBucket; 7] = [
        CategoryBucket::FoodDining,
        CategoryBucket::Transport,
        CategoryBucket::Shopping,
        CategoryBucket::Entertainment,
        CategoryBucket::UtilityBill,
        CategoryBucket::HealthMedical,
        CategoryBucket::HomeHousing,
    ];

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            CategoryBucket::FoodDining => &["Food", "Dining", "Restaurant", "Grocery", "Market"],
            CategoryBucket::Transport => &[
                "Transport", "Travel", "Gas", "Fuel", "Parking", "Uber", "Lyft", "Taxi",
            ],
            CategoryBucket::Shopping => &["Shopping", "Retail", "Store", "Mall", "Online"],
            CategoryBucket::Entertainment => {
                &["Entertainment", "Movie", "Theater", "Concert", "Event"]
            }
            CategoryBucket::UtilityBill => {
                &["Utility", "Bill", "Payment", "Service", "Subscription"]
            }
            CategoryBucket::HealthMedical => {
                &["Health", "Medical", "Dental", "Pharmacy", "Insurance"]
            }
            CategoryBucket::HomeHousing => &["Home", "Housing", "Rent", "Mortgage", "Maintenance"],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryBucket::FoodDining => "Food/Dining",
            CategoryBucket::Transport => "Transport",
            CategoryBucket::Shopping => "Shopping",
            CategoryBucket::Entertainment => "Entertainment",
            CategoryBucket::UtilityBill => "Utility/Bill",
            CategoryBucket::HealthMedical => "Health/Medical",
            CategoryBucket::HomeHousing => "Home/Housing",
        }
    }

    /// Regex source matching any keyword of the bucket as a whole word.
    pub(crate) fn pattern(&self) -> String {
        format!(r"(?i)\b(?:{})\b", self.keywords().join("|"))
    }

    /// Bucket owning `keyword`, compared case-insensitively.
    pub fn of_keyword(keyword: &str) -> Option<CategoryBucket> {
        Self::ALL.into_iter().find(|bucket| {
            bucket
                .keywords()
                .iter()
                .any(|k| k.eq_ignore_ascii_case(keyword))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of_keyword() {
        assert_eq!(CategoryBucket::of_keyword("grocery"), Some(CategoryBucket::FoodDining));
        assert_eq!(CategoryBucket::of_keyword("UBER"), Some(CategoryBucket::Transport));
        assert_eq!(CategoryBucket::of_keyword("rent"), Some(CategoryBucket::HomeHousing));
        assert_eq!(CategoryBucket::of_keyword("payroll"), None);
    }

    #[test]
    fn test_pattern_is_whole_word() {
        let re = regex::Regex::new(&CategoryBucket::Transport.pattern()).unwrap();
        assert!(re.is_match("paid for parking downtown"));
        assert!(!re.is_match("Gasoline"));
    }

    #[test]
    fn test_labels_cover_all_buckets() {
        let labels: Vec<_> = CategoryBucket::ALL.iter().map(|b| b.label()).collect();
        assert_eq!(labels.len(), 7);
        assert!(labels.contains(&"Health/Medical"));
    }
}
