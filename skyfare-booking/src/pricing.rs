use chrono::Utc;
use skyfare_core::offers::OfferSnapshot;
use skyfare_core::payment::PaymentIntent;

/// Currency applied when the platform omits `total_currency`.
pub const FALLBACK_CURRENCY: &str = "USD";

/// Pick the single offer to book from a verified batch.
///
/// The platform models a round trip as one multi-slice offer, so for
/// round-trip requests the first multi-leg offer wins; otherwise (and when no
/// combined fare exists) the first verified offer is used. The remaining
/// offers are audit metadata only.
pub fn select_offer(offers: &[OfferSnapshot], is_roundtrip: bool) -> Option<&OfferSnapshot> {
    if is_roundtrip {
        if let Some(combined) = offers.iter().find(|o| o.is_multi_leg()) {
            return Some(combined);
        }
    }
    offers.first()
}

/// Authoritative price of the selected offer. The client-supplied amount is
/// display-only and never charged.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferPrice {
    /// Major units, e.g. 250.00.
    pub amount: f64,
    pub currency: String,
}

impl OfferPrice {
    pub fn from_offer(offer: &OfferSnapshot) -> Self {
        let amount = offer.total_amount.trim().parse::<f64>().unwrap_or(0.0);
        let currency = offer
            .total_currency
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| FALLBACK_CURRENCY.to_string());
        Self { amount, currency }
    }
}

/// Percentage gap between the offer's base price and what the confirmed
/// intent actually authorized (gateway amounts are in minor units).
pub fn markup_percentage(price: &OfferPrice, intent: Option<&PaymentIntent>) -> f64 {
    let Some(intent) = intent else { return 0.0 };
    if price.amount <= 0.0 {
        return 0.0;
    }
    let paid_major = intent.amount as f64 / 100.0;
    let pct = (paid_major - price.amount) / price.amount * 100.0;
    (pct * 100.0).round() / 100.0
}

/// Descriptive metadata attached to the order for audit: trip type, price
/// breakdown, every requested offer id, and the one actually booked.
pub fn build_order_metadata(
    is_roundtrip: bool,
    price: &OfferPrice,
    intent: Option<&PaymentIntent>,
    all_offer_ids: &[String],
    selected_offer_id: &str,
) -> serde_json::Value {
    let charged_major = intent
        .map(|i| i.amount as f64 / 100.0)
        .unwrap_or(price.amount);

    serde_json::json!({
        "trip_type": if is_roundtrip { "roundtrip" } else { "oneway" },
        "base_amount": format!("{:.2}", price.amount),
        "total_amount": format!("{:.2}", charged_major),
        "currency": price.currency,
        "markup_percentage": markup_percentage(price, intent),
        "offer_ids": all_offer_ids,
        "primary_offer_id": selected_offer_id,
        "confirmed_at": Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use skyfare_core::offers::OfferSlice;
    use skyfare_core::payment::PaymentStatus;

    fn offer(id: &str, amount: &str, currency: Option<&str>, slices: usize) -> OfferSnapshot {
        OfferSnapshot {
            id: id.to_string(),
            total_amount: amount.to_string(),
            total_currency: currency.map(String::from),
            expires_at: Utc::now() + Duration::minutes(15),
            slices: (0..slices)
                .map(|_| OfferSlice { id: None, origin: None, destination: None, departing_at: None })
                .collect(),
        }
    }

    fn intent(amount_minor: i64) -> PaymentIntent {
        PaymentIntent {
            id: "pi_1".to_string(),
            amount: amount_minor,
            currency: "USD".to_string(),
            status: PaymentStatus::Succeeded,
            client_secret: None,
        }
    }

    #[test]
    fn test_roundtrip_prefers_multi_leg() {
        let offers = vec![offer("one_way", "120.00", None, 1), offer("combined", "210.00", None, 2)];
        assert_eq!(select_offer(&offers, true).unwrap().id, "combined");
    }

    #[test]
    fn test_roundtrip_falls_back_to_first() {
        let offers = vec![offer("a", "120.00", None, 1), offer("b", "130.00", None, 1)];
        assert_eq!(select_offer(&offers, true).unwrap().id, "a");
    }

    #[test]
    fn test_one_way_takes_first() {
        let offers = vec![offer("a", "120.00", None, 1), offer("b", "130.00", None, 2)];
        assert_eq!(select_offer(&offers, false).unwrap().id, "a");
    }

    #[test]
    fn test_price_parse_and_currency_fallback() {
        let price = OfferPrice::from_offer(&offer("a", "250.40", None, 1));
        assert_eq!(price.amount, 250.40);
        assert_eq!(price.currency, "USD");

        let price = OfferPrice::from_offer(&offer("a", "99.00", Some("GBP"), 1));
        assert_eq!(price.currency, "GBP");
    }

    #[test]
    fn test_unparseable_amount_is_zero() {
        let price = OfferPrice::from_offer(&offer("a", "n/a", None, 1));
        assert_eq!(price.amount, 0.0);
    }

    #[test]
    fn test_markup_percentage() {
        let price = OfferPrice { amount: 200.0, currency: "USD".to_string() };
        // Charged 230.00 against a 200.00 base -> 15% markup.
        assert_eq!(markup_percentage(&price, Some(&intent(23000))), 15.0);
        assert_eq!(markup_percentage(&price, None), 0.0);

        let zero = OfferPrice { amount: 0.0, currency: "USD".to_string() };
        assert_eq!(markup_percentage(&zero, Some(&intent(23000))), 0.0);
    }

    #[test]
    fn test_metadata_contents() {
        let price = OfferPrice { amount: 200.0, currency: "USD".to_string() };
        let ids = vec!["off_1".to_string(), "off_2".to_string()];
        let meta = build_order_metadata(true, &price, Some(&intent(23000)), &ids, "off_2");

        assert_eq!(meta["trip_type"], "roundtrip");
        assert_eq!(meta["base_amount"], "200.00");
        assert_eq!(meta["total_amount"], "230.00");
        assert_eq!(meta["markup_percentage"], 15.0);
        assert_eq!(meta["primary_offer_id"], "off_2");
        assert_eq!(meta["offer_ids"].as_array().unwrap().len(), 2);
        assert!(meta["confirmed_at"].as_str().unwrap().contains('T'));
    }
}
