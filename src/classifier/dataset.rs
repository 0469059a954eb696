//! Synthetic labelled dataset for training the smell classifier
//!
//! Hand-written seed snippets for each smell category and for clean code,
//! expanded with identifier word substitutions and a small share of flipped
//! labels. Generation is deterministic for a given seed.

use anyhow::Context;
use rand::seq::{index, IndexedRandom};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::models::Severity;

/// Number of substituted copies generated per seed sample
pub const VARIATIONS_PER_SAMPLE: usize = 12;

/// Share of samples whose label is flipped
pub const LABEL_NOISE_RATE: f64 = 0.05;

/// What a seed snippet was written to illustrate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleCategory {
    LongMethod,
    Borderline,
    TooManyParameters,
    DeepNesting,
    GodClass,
    None,
}

/// One labelled code snippet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub code: String,
    pub smell_type: SampleCategory,
    pub has_smell: bool,
    /// `None` for clean samples
    pub severity: Option<Severity>,
}

impl LabeledSample {
    fn new(code: &str, smell_type: SampleCategory, has_smell: bool, severity: Option<Severity>) -> Self {
        Self {
            code: code.to_string(),
            smell_type,
            has_smell,
            severity,
        }
    }
}

const LONG_METHODS: &[&str] = &[
    "def process_user_data(user_id, name, email, age, address):
    user = get_user(user_id)
    if user:
        validate_email(email)
        validate_age(age)
        update_database(user_id, name, email)
        send_notification(email)
        log_activity(user_id)
        calculate_metrics(user)
        generate_report(user)
        update_cache(user_id)
        trigger_webhook(user)
        cleanup_old_data()
        process_analytics(user)
        sync_external_systems(user)
        update_search_index(user)
        invalidate_cache(user_id)
        send_welcome_email(email)
        create_audit_log(user_id)
        update_statistics()
        refresh_recommendations(user)
    return user",
    "def calculate_invoice(items, tax_rate, discount, shipping):
    total = 0
    for item in items:
        price = item.price
        quantity = item.quantity
        subtotal = price * quantity
        total += subtotal
    tax = total * tax_rate
    total_with_tax = total + tax
    discount_amount = total_with_tax * discount
    final_total = total_with_tax - discount_amount
    shipping_cost = calculate_shipping(items)
    grand_total = final_total + shipping_cost
    apply_loyalty_discount(grand_total)
    check_minimum_order(grand_total)
    validate_payment_method()
    process_payment(grand_total)
    send_confirmation_email()
    update_inventory(items)
    generate_invoice_pdf()
    log_transaction(grand_total)
    return grand_total",
];

const BORDERLINE_LONG: &[&str] = &[
    "def process_order(order):
    validate_order(order)
    check_inventory(order)
    calculate_total(order)
    apply_discount(order)
    process_payment(order)
    send_confirmation(order)
    update_inventory(order)
    log_transaction(order)
    return order",
    "def generate_report(data):
    filtered = filter_data(data)
    sorted_data = sort_data(filtered)
    grouped = group_by_category(sorted_data)
    calculated = calculate_metrics(grouped)
    formatted = format_output(calculated)
    return formatted",
];

const MANY_PARAMS: &[&str] = &[
    "def create_user(name, email, password, age, country, city, zipcode, phone, address):
    return User(name, email, password, age, country, city, zipcode, phone, address)",
    "def send_email(to, from_addr, subject, body, cc, bcc, priority, attachments, reply_to):
    email = Email(to, from_addr, subject, body)
    return email.send()",
    "def process_payment(card_number, cvv, expiry, amount, currency, customer_id, order_id, billing_address):
    payment = Payment(card_number, cvv, expiry, amount)
    return payment.process()",
];

const ACCEPTABLE_PARAMS: &[&str] = &[
    "def create_user(name, email, password):
    return User(name, email, password)",
    "def calculate_price(base, tax, discount):
    return base * (1 + tax) * (1 - discount)",
    "def send_notification(user_id, message):
    notification = Notification(user_id, message)
    return notification.send()",
];

const DEEP_NESTING: &[&str] = &[
    "def validate_input(data):
    if data:
        if data.user:
            if data.user.age:
                if data.user.age > 18:
                    if data.user.verified:
                        if data.user.email:
                            return True
    return False",
    "def process_order(order):
    if order:
        if order.items:
            for item in order.items:
                if item.available:
                    if item.price > 0:
                        if item.quantity > 0:
                            if check_stock(item):
                                add_to_cart(item)",
];

const MODERATE_NESTING: &[&str] = &[
    "def validate_user(user):
    if not user:
        return False
    if not user.email:
        return False
    if user.age < 18:
        return False
    return True",
    "def process_item(item):
    if item.available:
        if item.price > 0:
            return add_to_cart(item)
    return None",
];

const GOD_CLASSES: &[&str] = &["class UserManager:
    def create_user(self): pass
    def update_user(self): pass
    def delete_user(self): pass
    def validate_user(self): pass
    def send_email(self): pass
    def log_activity(self): pass
    def calculate_metrics(self): pass
    def generate_report(self): pass
    def export_data(self): pass
    def import_data(self): pass
    def sync_database(self): pass
    def backup_data(self): pass
    def restore_data(self): pass
    def archive_user(self): pass"];

const GOOD_CLASSES: &[&str] = &[
    "class User:
    def __init__(self, name, email):
        self.name = name
        self.email = email

    def validate(self):
        return self.email and '@' in self.email

    def to_dict(self):
        return {'name': self.name, 'email': self.email}",
    "class Calculator:
    def add(self, a, b):
        return a + b

    def subtract(self, a, b):
        return a - b

    def multiply(self, a, b):
        return a * b",
];

const CLEAN_CODE: &[&str] = &[
    "def calculate_total(items):\n    return sum(item.price * item.quantity for item in items)",
    "def get_user_by_id(user_id):\n    return database.query(User).filter_by(id=user_id).first()",
    "def format_date(date):\n    return date.strftime('%Y-%m-%d')",
    "def is_valid_age(age):\n    return 0 < age < 150",
    "def calculate_discount(price, percentage):\n    return price * (percentage / 100)",
    "def is_empty(value):\n    return value is None or len(value) == 0",
    "def find_max(numbers):\n    return max(numbers) if numbers else None",
    "def is_even(number):\n    return number % 2 == 0",
    "def reverse_string(text):\n    return text[::-1]",
    "def square(x):\n    return x * x",
    "def get_first(items):\n    return items[0] if items else None",
    "def concat(a, b):\n    return str(a) + str(b)",
    "def is_positive(num):\n    return num > 0",
    "def average(numbers):\n    return sum(numbers) / len(numbers)",
    "def capitalize_name(name):\n    return name.title()",
    "def get_length(items):\n    return len(items)",
    "def multiply_by_two(x):\n    return x * 2",
    "def is_none(value):\n    return value is None",
    "def join_strings(strings):\n    return ' '.join(strings)",
    "def get_last(items):\n    return items[-1] if items else None",
    "def count_items(items):\n    return len(items)",
    "def add_tax(price):\n    return price * 1.1",
    "def remove_spaces(text):\n    return text.strip()",
    "def to_lowercase(text):\n    return text.lower()",
    "def is_digit(char):\n    return char.isdigit()",
    "def abs_value(num):\n    return abs(num)",
    "def round_number(num):\n    return round(num, 2)",
    "def split_text(text):\n    return text.split()",
    "def contains(items, value):\n    return value in items",
    "def get_min(numbers):\n    return min(numbers)",
    "def format_price(amount):\n    return f'${amount:.2f}'",
    "def is_alpha(char):\n    return char.isalpha()",
    "def negate(value):\n    return not value",
    "def increment(num):\n    return num + 1",
    "def decrement(num):\n    return num - 1",
    "def get_type(obj):\n    return type(obj).__name__",
];

/// Identifier words and their substitutes, applied in this order
const WORD_VARIATIONS: &[(&str, &[&str])] = &[
    ("user", &["customer", "account", "person", "member", "client"]),
    ("order", &["purchase", "transaction", "sale", "booking"]),
    ("data", &["info", "details", "record", "entity"]),
    ("email", &["mail", "message", "notification"]),
    ("process", &["handle", "execute", "perform"]),
    ("calculate", &["compute", "determine", "evaluate"]),
    ("validate", &["verify", "check", "confirm"]),
];

/// The hand-written seed samples, before variation and noise
pub fn seed_samples(rng: &mut impl Rng) -> Vec<LabeledSample> {
    use SampleCategory as C;

    let mut samples = Vec::new();
    let groups: [(&[&str], C, Option<bool>, Option<Severity>); 8] = [
        (LONG_METHODS, C::LongMethod, Some(true), Some(Severity::High)),
        // borderline labels are drawn at random
        (BORDERLINE_LONG, C::Borderline, None, Some(Severity::Medium)),
        (MANY_PARAMS, C::TooManyParameters, Some(true), Some(Severity::High)),
        (ACCEPTABLE_PARAMS, C::None, Some(false), None),
        (DEEP_NESTING, C::DeepNesting, Some(true), Some(Severity::High)),
        (MODERATE_NESTING, C::None, Some(false), None),
        (GOD_CLASSES, C::GodClass, Some(true), Some(Severity::High)),
        (GOOD_CLASSES, C::None, Some(false), None),
    ];

    for (snippets, category, label, severity) in groups {
        for code in snippets {
            let has_smell = label.unwrap_or_else(|| rng.random_bool(0.5));
            samples.push(LabeledSample::new(code, category, has_smell, severity));
        }
    }
    for code in CLEAN_CODE {
        samples.push(LabeledSample::new(code, C::None, false, None));
    }
    samples
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Substitute identifier words with a random synonym.
///
/// A word is replaced when it occurs case-insensitively; both the lowercase
/// and the capitalized spelling are rewritten.
pub fn vary_identifiers(code: &str, rng: &mut impl Rng) -> String {
    let mut varied = code.to_string();
    for (original, replacements) in WORD_VARIATIONS {
        if !varied.to_lowercase().contains(original) {
            continue;
        }
        let Some(replacement) = replacements.choose(rng) else {
            continue;
        };
        varied = varied.replace(original, replacement);
        varied = varied.replace(&capitalize(original), &capitalize(replacement));
    }
    varied
}

/// Build the full training dataset for a seed
pub fn generate(seed: u64) -> Vec<LabeledSample> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let base = seed_samples(&mut rng);

    let mut expanded = base.clone();
    for _ in 0..VARIATIONS_PER_SAMPLE {
        for sample in &base {
            expanded.push(LabeledSample {
                code: vary_identifiers(&sample.code, &mut rng),
                ..sample.clone()
            });
        }
    }

    let num_noise = (expanded.len() as f64 * LABEL_NOISE_RATE) as usize;
    if num_noise > 0 {
        for idx in index::sample(&mut rng, expanded.len(), num_noise).into_vec() {
            expanded[idx].has_smell = !expanded[idx].has_smell;
        }
    }

    expanded
}

/// Write samples as pretty JSON
pub fn save(samples: &[LabeledSample], path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(samples)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Read samples written by [`save`]
pub fn load(path: &Path) -> anyhow::Result<Vec<LabeledSample>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid dataset in {}", path.display()))
}
