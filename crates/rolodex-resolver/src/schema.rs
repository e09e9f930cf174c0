//! Attribute schema: which rule resolves which attribute
//!
//! Range scales turn range labels and raw numbers into bucket midpoints.
//! The tech catalog assigns set items to categories and knows which items
//! cannot coexist on one site.

use rolodex_domain::AttributeKind;
use std::collections::BTreeMap;

/// One bucket of a range scale
#[derive(Debug, Clone, PartialEq)]
pub struct RangeBucket {
    /// Canonical label, used as the resolved value (e.g. "$100K-500K")
    pub label: String,

    /// Inclusive lower bound
    pub low: f64,

    /// Inclusive upper bound, `None` for the open-ended top bucket
    pub high: Option<f64>,

    /// Representative value used for averaging
    pub midpoint: f64,
}

impl RangeBucket {
    fn new(label: &str, low: f64, high: Option<f64>, midpoint: f64) -> Self {
        Self {
            label: label.to_string(),
            low,
            high,
            midpoint,
        }
    }
}

/// Ordered, non-overlapping buckets for one numeric-range attribute
#[derive(Debug, Clone, PartialEq)]
pub struct RangeScale {
    buckets: Vec<RangeBucket>,
}

impl RangeScale {
    /// Build a scale from buckets sorted by `low`
    ///
    /// Returns `None` if the list is empty or not strictly ascending.
    pub fn new(buckets: Vec<RangeBucket>) -> Option<Self> {
        if buckets.is_empty() || buckets.windows(2).any(|w| w[0].low >= w[1].low) {
            return None;
        }
        Some(Self { buckets })
    }

    /// Annual revenue in dollars
    pub fn revenue() -> Self {
        Self {
            buckets: vec![
                RangeBucket::new("$0-100K", 0.0, Some(100_000.0), 50_000.0),
                RangeBucket::new("$100K-500K", 100_000.0, Some(500_000.0), 300_000.0),
                RangeBucket::new("$500K-1M", 500_000.0, Some(1_000_000.0), 750_000.0),
                RangeBucket::new("$1M-5M", 1_000_000.0, Some(5_000_000.0), 3_000_000.0),
                RangeBucket::new("$5M-10M", 5_000_000.0, Some(10_000_000.0), 7_500_000.0),
                RangeBucket::new("$10M+", 10_000_000.0, None, 15_000_000.0),
            ],
        }
    }

    /// Employee headcount
    pub fn employees() -> Self {
        Self {
            buckets: vec![
                RangeBucket::new("1-10", 1.0, Some(10.0), 5.5),
                RangeBucket::new("11-50", 11.0, Some(50.0), 30.5),
                RangeBucket::new("51-200", 51.0, Some(200.0), 125.5),
                RangeBucket::new("201-500", 201.0, Some(500.0), 350.5),
                RangeBucket::new("501-1000", 501.0, Some(1000.0), 750.5),
                RangeBucket::new("1000+", 1001.0, None, 1500.0),
            ],
        }
    }

    /// Buckets in ascending order
    pub fn buckets(&self) -> &[RangeBucket] {
        &self.buckets
    }

    /// Bucket with the given label (case and whitespace insensitive)
    pub fn bucket(&self, label: &str) -> Option<&RangeBucket> {
        let wanted = squash(label);
        self.buckets.iter().find(|b| squash(&b.label) == wanted)
    }

    /// Bucket containing `amount`
    ///
    /// A bucket spans from its `low` up to the next bucket's `low`, so
    /// fractional values between labelled bounds still land somewhere.
    /// Amounts below the first bucket clamp to it; negatives map to nothing.
    pub fn containing(&self, amount: f64) -> Option<&RangeBucket> {
        if !amount.is_finite() || amount < 0.0 {
            return None;
        }
        self.buckets
            .iter()
            .rev()
            .find(|b| amount >= b.low)
            .or_else(|| self.buckets.first())
    }

    /// Bucket whose midpoint is closest to `value`; ties go to the lower bucket
    pub fn nearest(&self, value: f64) -> Option<&RangeBucket> {
        let mut best: Option<&RangeBucket> = None;
        for bucket in &self.buckets {
            let distance = (bucket.midpoint - value).abs();
            match best {
                Some(current) if (current.midpoint - value).abs() <= distance => {}
                _ => best = Some(bucket),
            }
        }
        best
    }

    /// Map a reported value to its bucket
    ///
    /// Accepts a bucket label (`"$100K-500K"`), a raw amount (`"250000"`,
    /// `"$1.2M"`), a range (`"100-250"`) or an open range (`"1000+"`).
    pub fn classify(&self, value: &str) -> Option<&RangeBucket> {
        if let Some(bucket) = self.bucket(value) {
            return Some(bucket);
        }
        let cleaned = squash(value);
        if let Some(open) = cleaned.strip_suffix('+') {
            return self.containing(parse_amount(open)?);
        }
        if let Some((lo, hi)) = cleaned.split_once('-') {
            let lo = parse_amount(lo)?;
            let hi = parse_amount(hi)?;
            return self.containing((lo + hi) / 2.0);
        }
        self.containing(parse_amount(&cleaned)?)
    }
}

/// Parse `"$1.5m"`, `"250k"`, `"12,000"` into a number
fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect::<String>()
        .to_lowercase();
    let (digits, multiplier) = match cleaned.chars().last()? {
        'k' => (&cleaned[..cleaned.len() - 1], 1_000.0),
        'm' => (&cleaned[..cleaned.len() - 1], 1_000_000.0),
        'b' => (&cleaned[..cleaned.len() - 1], 1_000_000_000.0),
        _ => (cleaned.as_str(), 1.0),
    };
    let amount: f64 = digits.parse().ok()?;
    amount.is_finite().then_some(amount * multiplier)
}

fn squash(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

/// Technology item → category, plus mutually-exclusive pairs
#[derive(Debug, Clone, PartialEq)]
pub struct TechCatalog {
    categories: BTreeMap<String, String>,
    exclusive: Vec<(String, String)>,
}

impl Default for TechCatalog {
    fn default() -> Self {
        let mut catalog = Self::empty();
        for item in ["wordpress", "wix", "squarespace", "webflow", "joomla", "drupal", "ghost"] {
            catalog.add_item("cms", item);
        }
        for item in ["shopify", "woocommerce", "magento", "bigcommerce", "prestashop"] {
            catalog.add_item("ecommerce", item);
        }
        for item in ["google analytics", "plausible", "matomo", "adobe analytics"] {
            catalog.add_item("analytics", item);
        }
        for item in ["hubspot", "salesforce", "zoho", "pipedrive"] {
            catalog.add_item("crm", item);
        }
        for item in ["mailchimp", "klaviyo", "sendgrid"] {
            catalog.add_item("email", item);
        }
        for item in ["cloudflare", "fastly", "akamai"] {
            catalog.add_item("cdn", item);
        }

        // A site runs on one of these at a time
        for (a, b) in [
            ("wordpress", "wix"),
            ("wordpress", "squarespace"),
            ("wix", "squarespace"),
            ("wix", "webflow"),
            ("squarespace", "webflow"),
            ("shopify", "woocommerce"),
            ("shopify", "magento"),
            ("shopify", "bigcommerce"),
            ("woocommerce", "magento"),
        ] {
            catalog.add_exclusive(a, b);
        }
        catalog
    }
}

impl TechCatalog {
    /// Catalog with no known items
    pub fn empty() -> Self {
        Self {
            categories: BTreeMap::new(),
            exclusive: Vec::new(),
        }
    }

    /// Register an item under a category
    pub fn add_item(&mut self, category: &str, item: &str) {
        self.categories
            .insert(item.trim().to_lowercase(), category.trim().to_lowercase());
    }

    /// Declare two items that cannot be observed together
    pub fn add_exclusive(&mut self, a: &str, b: &str) {
        let (a, b) = (a.trim().to_lowercase(), b.trim().to_lowercase());
        let pair = if a <= b { (a, b) } else { (b, a) };
        if !self.exclusive.contains(&pair) {
            self.exclusive.push(pair);
        }
    }

    /// Split a reported item into `(category, item)`
    ///
    /// `"cms:WordPress"` names its category explicitly. Otherwise the catalog
    /// decides; an item it does not know forms a category of its own, so
    /// unrelated unknown tools never compete for one slot.
    pub fn categorize(&self, raw: &str) -> Option<(String, String)> {
        let raw = raw.trim().to_lowercase();
        if let Some((category, item)) = raw.split_once(':') {
            let (category, item) = (category.trim(), item.trim());
            if !category.is_empty() && !item.is_empty() {
                return Some((category.to_string(), item.to_string()));
            }
        }
        let item = raw.trim_matches(':').trim().to_string();
        if item.is_empty() {
            return None;
        }
        let category = self.categories.get(&item).cloned().unwrap_or_else(|| item.clone());
        Some((category, item))
    }

    /// Whether two items are declared mutually exclusive
    pub fn is_exclusive(&self, a: &str, b: &str) -> bool {
        let pair = if a <= b {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        };
        self.exclusive.contains(&pair)
    }
}

/// Attribute name → resolution rule
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSchema {
    kinds: BTreeMap<String, AttributeKind>,
    scales: BTreeMap<String, RangeScale>,
    catalog: TechCatalog,
}

impl Default for AttributeSchema {
    /// `size` categorical, `revenue` and `employees` numeric-range,
    /// `tech_stack` set-valued
    fn default() -> Self {
        Self::empty()
            .with_categorical("size")
            .with_numeric_range("revenue", RangeScale::revenue())
            .with_numeric_range("employees", RangeScale::employees())
            .with_set_valued("tech_stack")
    }
}

impl AttributeSchema {
    /// Schema where every attribute is categorical
    pub fn empty() -> Self {
        Self {
            kinds: BTreeMap::new(),
            scales: BTreeMap::new(),
            catalog: TechCatalog::default(),
        }
    }

    /// Resolve `name` by plurality vote
    pub fn with_categorical(mut self, name: &str) -> Self {
        let name = name.trim().to_lowercase();
        self.scales.remove(&name);
        self.kinds.insert(name, AttributeKind::Categorical);
        self
    }

    /// Resolve `name` by weighted midpoint over `scale`
    pub fn with_numeric_range(mut self, name: &str, scale: RangeScale) -> Self {
        let name = name.trim().to_lowercase();
        self.kinds.insert(name.clone(), AttributeKind::NumericRange);
        self.scales.insert(name, scale);
        self
    }

    /// Resolve `name` as a set of items, one per category
    pub fn with_set_valued(mut self, name: &str) -> Self {
        let name = name.trim().to_lowercase();
        self.scales.remove(&name);
        self.kinds.insert(name, AttributeKind::SetValued);
        self
    }

    /// Replace the tech catalog
    pub fn with_catalog(mut self, catalog: TechCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Rule for an attribute; unknown names are categorical
    pub fn kind_of(&self, name: &str) -> AttributeKind {
        self.kinds.get(name).copied().unwrap_or(AttributeKind::Categorical)
    }

    /// Range scale of a numeric-range attribute
    pub fn scale_for(&self, name: &str) -> Option<&RangeScale> {
        self.scales.get(name)
    }

    /// Catalog used for set-valued attributes
    pub fn catalog(&self) -> &TechCatalog {
        &self.catalog
    }
}
