//! Row and field extraction from the rendered listing page.
//!
//! Extraction runs on an HTML snapshot rather than the live DOM: the
//! browser session hands over `outerHTML` once and every lookup below is
//! an offline CSS query. A field whose element is missing never aborts
//! the run; it is replaced by that field's fixed placeholder literal.

use chrono::Local;
use scraper::{ElementRef, Html, Selector};

/// Upper bound on rows extracted per run.
pub const MAX_ROWS: usize = 10;

/// Structural condition the page must satisfy before extraction starts.
pub const ROW_SELECTOR: &str = "table tbody tr";

const NAME_SELECTOR: &str = "td:nth-child(3) p";
const PRICE_SELECTOR: &str = "td:nth-child(4) a";
const CHANGE_24H_SELECTOR: &str = "td:nth-child(5)";
const MARKET_CAP_SELECTOR: &str = "td:nth-child(8) p";

// Placeholder literals substituted when a field lookup finds no element.
const NAME_FALLBACK: &str = "13";
const PRICE_FALLBACK: &str = "46";
const CHANGE_24H_FALLBACK: &str = "35";
const MARKET_CAP_FALLBACK: &str = "24";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One extracted listing row.
#[derive(Debug, Clone)]
pub struct PriceRecord {
    /// 1-based position in the extracted sequence. Not read from the page.
    pub rank: u32,
    pub name: String,
    pub price: String,
    pub change_24h: String,
    pub market_cap: String,
    /// Local wall-clock time at extraction, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
}

struct FieldSelectors {
    name: Selector,
    price: Selector,
    change_24h: Selector,
    market_cap: Selector,
}

impl FieldSelectors {
    fn new() -> Self {
        // Static selectors, parse cannot fail.
        Self {
            name: Selector::parse(NAME_SELECTOR).unwrap(),
            price: Selector::parse(PRICE_SELECTOR).unwrap(),
            change_24h: Selector::parse(CHANGE_24H_SELECTOR).unwrap(),
            market_cap: Selector::parse(MARKET_CAP_SELECTOR).unwrap(),
        }
    }
}

/// Extract up to [`MAX_ROWS`] records from a rendered listing snapshot.
///
/// Rows are taken in document order and ranked by that order. Extraction
/// is infallible: a row whose sub-elements are all missing still yields a
/// complete record built from fallback literals.
pub fn parse_listing(html: &str) -> Vec<PriceRecord> {
    let document = Html::parse_document(html);
    let rows = Selector::parse(ROW_SELECTOR).unwrap();
    let fields = FieldSelectors::new();

    document
        .select(&rows)
        .take(MAX_ROWS)
        .enumerate()
        .map(|(idx, row)| extract_record((idx + 1) as u32, &row, &fields))
        .collect()
}

fn extract_record(rank: u32, row: &ElementRef<'_>, fields: &FieldSelectors) -> PriceRecord {
    PriceRecord {
        rank,
        name: field_text(row, &fields.name, NAME_FALLBACK),
        price: field_text(row, &fields.price, PRICE_FALLBACK),
        change_24h: field_text(row, &fields.change_24h, CHANGE_24H_FALLBACK),
        market_cap: field_text(row, &fields.market_cap, MARKET_CAP_FALLBACK),
        timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
    }
}

/// Displayed text of the first descendant matching `selector`, whitespace
/// collapsed. An element that exists but holds no text yields an empty
/// string; only a missing element yields the fallback.
fn field_text(row: &ElementRef<'_>, selector: &Selector, fallback: &str) -> String {
    match row.select(selector).next() {
        Some(element) => {
            let raw: String = element.text().collect();
            raw.split_whitespace().collect::<Vec<_>>().join(" ")
        }
        None => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn fixture_row(name: &str, price: &str, change: &str, cap: &str) -> String {
        format!(
            "<tr>\
             <td><span>star</span></td>\
             <td><p>0</p></td>\
             <td><div><p>{name}</p><p>SYM</p></div></td>\
             <td><a href=\"/x/\"><span>{price}</span></a></td>\
             <td><span>{change}</span></td>\
             <td><span>0.00%</span></td>\
             <td><p>$0</p></td>\
             <td><p>{cap}</p></td>\
             </tr>"
        )
    }

    fn listing_page(rows: &[String]) -> String {
        format!(
            "<html><body><table><thead><tr><th>h</th></tr></thead>\
             <tbody>{}</tbody></table></body></html>",
            rows.join("")
        )
    }

    fn numbered_page(count: usize) -> String {
        let rows: Vec<String> = (0..count)
            .map(|i| {
                fixture_row(
                    &format!("Coin{i}"),
                    &format!("${i}.00"),
                    "1.00%",
                    &format!("${i}B"),
                )
            })
            .collect();
        listing_page(&rows)
    }

    #[test]
    fn test_extracts_all_fields_in_order() {
        let page = listing_page(&[
            fixture_row("Bitcoin", "$64,123.45", "2.15%", "$1.26T"),
            fixture_row("Ethereum", "$3,145.67", "-0.82%", "$378.91B"),
            fixture_row("Tether", "$1.00", "0.01%", "$112.44B"),
        ]);

        let records = parse_listing(&page);
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].rank, 1);
        assert_eq!(records[0].name, "Bitcoin");
        assert_eq!(records[0].price, "$64,123.45");
        assert_eq!(records[0].change_24h, "2.15%");
        assert_eq!(records[0].market_cap, "$1.26T");

        assert_eq!(records[1].rank, 2);
        assert_eq!(records[1].name, "Ethereum");
        assert_eq!(records[2].rank, 3);
        assert_eq!(records[2].name, "Tether");
    }

    #[test]
    fn test_rank_ignores_page_rank_column() {
        // Every fixture row carries "0" in the rank cell; extracted ranks
        // still count 1..n by position.
        let records = parse_listing(&numbered_page(4));
        let ranks: Vec<u32> = records.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_caps_at_ten_rows() {
        let records = parse_listing(&numbered_page(15));
        assert_eq!(records.len(), MAX_ROWS);
        assert_eq!(records[9].name, "Coin9");
    }

    #[test]
    fn test_fewer_than_ten_rows() {
        let records = parse_listing(&numbered_page(3));
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_missing_name_uses_fallback() {
        // Name cell exists but holds no <p>, so the name lookup misses
        // while the other fields resolve normally.
        let row = "<tr>\
                   <td>star</td><td>1</td>\
                   <td><div><span>Bitcoin</span></div></td>\
                   <td><a>$64,000.00</a></td>\
                   <td>2.15%</td><td>5.00%</td>\
                   <td><p>$30B</p></td>\
                   <td><p>$1.26T</p></td>\
                   </tr>";
        let records = parse_listing(&listing_page(&[row.to_string()]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "13");
        assert_eq!(records[0].price, "$64,000.00");
        assert_eq!(records[0].change_24h, "2.15%");
        assert_eq!(records[0].market_cap, "$1.26T");
    }

    #[test]
    fn test_bare_row_uses_every_fallback() {
        let records = parse_listing(&listing_page(&["<tr><td>only</td></tr>".to_string()]));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "13");
        assert_eq!(records[0].price, "46");
        assert_eq!(records[0].change_24h, "35");
        assert_eq!(records[0].market_cap, "24");
    }

    #[test]
    fn test_empty_element_yields_empty_string_not_fallback() {
        let row = "<tr>\
                   <td>s</td><td>1</td>\
                   <td><p></p></td>\
                   <td><a>$1.00</a></td>\
                   <td>1%</td><td>2%</td>\
                   <td><p>$1B</p></td>\
                   <td><p>$2B</p></td>\
                   </tr>";
        let records = parse_listing(&listing_page(&[row.to_string()]));
        assert_eq!(records[0].name, "");
    }

    #[test]
    fn test_collapses_internal_whitespace() {
        let page = listing_page(&[fixture_row("  Bitcoin\n   Cash ", "$ 450.10", "1.0%", "$9B")]);
        let records = parse_listing(&page);
        assert_eq!(records[0].name, "Bitcoin Cash");
        assert_eq!(records[0].price, "$ 450.10");
    }

    #[test]
    fn test_empty_document_yields_no_records() {
        assert!(parse_listing("<html><body></body></html>").is_empty());
        assert!(parse_listing("").is_empty());
    }

    #[test]
    fn test_timestamp_is_well_formed() {
        let records = parse_listing(&numbered_page(1));
        let parsed = NaiveDateTime::parse_from_str(&records[0].timestamp, "%Y-%m-%d %H:%M:%S");
        assert!(parsed.is_ok(), "bad timestamp: {}", records[0].timestamp);
    }

    #[test]
    fn test_repeat_parse_is_stable_except_timestamp() {
        let page = numbered_page(5);
        let a = parse_listing(&page);
        let b = parse_listing(&page);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.rank, y.rank);
            assert_eq!(x.name, y.name);
            assert_eq!(x.price, y.price);
            assert_eq!(x.change_24h, y.change_24h);
            assert_eq!(x.market_cap, y.market_cap);
        }
    }
}
