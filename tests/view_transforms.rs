use xp_leaderboard::state::LeaderboardEntry;
use xp_leaderboard::views::{
    ITEMS_PER_PAGE, PageWindow, average_xp, filter_entries, highest_xp_on_page, share_text,
    top_three, total_pages,
};

fn entry(rank: u32, wallet: &str, xp: u64) -> LeaderboardEntry {
    LeaderboardEntry {
        rank,
        wallet_address: wallet.to_string(),
        xp,
    }
}

fn sample_page() -> Vec<LeaderboardEntry> {
    vec![
        entry(1, "0xAbCdEf0001", 900),
        entry(2, "0x1111abcd02", 1_200),
        entry(3, "0x2222222203", 300),
        entry(4, "0xFFFF000004", 50),
    ]
}

#[test]
fn total_pages_rounds_up() {
    assert_eq!(total_pages(0), 0);
    assert_eq!(total_pages(1), 1);
    assert_eq!(total_pages(95), 10);
    assert_eq!(total_pages(100), 10);
    assert_eq!(total_pages(101), 11);
}

#[test]
fn page_window_matches_items_per_page() {
    let window = PageWindow::new(3);
    assert_eq!(window.offset(), 2 * u64::from(ITEMS_PER_PAGE));
    assert_eq!(window.limit(), ITEMS_PER_PAGE);
}

#[test]
fn average_xp_handles_zero_users() {
    assert_eq!(average_xp(0, 0), 0);
    assert_eq!(average_xp(12_345, 0), 0);
}

#[test]
fn average_xp_rounds_half_up() {
    assert_eq!(average_xp(10, 4), 3); // 2.5
    assert_eq!(average_xp(9, 4), 2); // 2.25
    assert_eq!(average_xp(11, 4), 3); // 2.75
    assert_eq!(average_xp(1_234_567, 95), 12_995);
    assert_eq!(average_xp(u64::MAX, 1), u64::MAX);
}

#[test]
fn highest_xp_is_page_local() {
    assert_eq!(highest_xp_on_page(&sample_page()), 1_200);
    assert_eq!(highest_xp_on_page(&[]), 0);
}

#[test]
fn filter_is_case_insensitive_substring() {
    let page = sample_page();
    let hits = filter_entries(&page, "ABCD");
    let ranks: Vec<u32> = hits.iter().map(|e| e.rank).collect();
    assert_eq!(ranks, vec![1, 2]);

    let hits = filter_entries(&page, "ffff");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].rank, 4);

    assert!(filter_entries(&page, "zzz").is_empty());
}

#[test]
fn empty_filter_returns_page_unchanged() {
    let page = sample_page();
    let all = filter_entries(&page, "");
    assert_eq!(all.len(), page.len());
    assert!(all.iter().zip(page.iter()).all(|(a, b)| *a == b));
}

#[test]
fn whitespace_in_term_is_matched_literally() {
    let page = vec![entry(1, "0xabc", 10), entry(2, "0xdef", 20)];
    assert!(filter_entries(&page, " abc").is_empty());
    assert!(filter_entries(&page, "   ").is_empty());
    assert_eq!(filter_entries(&page, "abc").len(), 1);
}

#[test]
fn top_three_takes_at_most_three() {
    let page = sample_page();
    let podium = top_three(&page);
    assert_eq!(podium.len(), 3);
    assert_eq!(podium[2].rank, 3);
    assert_eq!(top_three(&page[..2]).len(), 2);
    assert!(top_three(&[]).is_empty());
}

#[test]
fn share_text_format() {
    assert_eq!(
        share_text("Bandit", 7, 4_200, "https://app.bandit.network"),
        "Hey! I am at Rank 7 with 4200 XP on Bandit's quest here: https://app.bandit.network"
    );
}
