//! The 47 prefectures in JIS X 0401 code order.

/// Prefecture names indexed by `code - 1`
pub const PREFECTURES: [&str; 47] = [
    "北海道", "青森県", "岩手県", "宮城県", "秋田県", "山形県", "福島県",
    "茨城県", "栃木県", "群馬県", "埼玉県", "千葉県", "東京都", "神奈川県",
    "新潟県", "富山県", "石川県", "福井県", "山梨県", "長野県",
    "岐阜県", "静岡県", "愛知県", "三重県", "滋賀県", "京都府", "大阪府",
    "兵庫県", "奈良県", "和歌山県", "鳥取県", "島根県", "岡山県", "広島県",
    "山口県", "徳島県", "香川県", "愛媛県", "高知県", "福岡県",
    "佐賀県", "長崎県", "熊本県", "大分県", "宮崎県", "鹿児島県", "沖縄県",
];

/// Tie-break order when a station name exists in several prefectures.
/// Biased toward the largest job markets.
pub const PRIORITY_PREFECTURES: [&str; 10] = [
    "東京都", "大阪府", "神奈川県", "京都府", "愛知県",
    "福岡県", "北海道", "兵庫県", "埼玉県", "千葉県",
];

/// Prefecture name for a JIS code (1..=47)
pub fn name_for_code(code: u32) -> Option<&'static str> {
    match code {
        1..=47 => Some(PREFECTURES[(code - 1) as usize]),
        _ => None,
    }
}

/// JIS code for a prefecture name
pub fn code_for_name(name: &str) -> Option<u32> {
    PREFECTURES
        .iter()
        .position(|pref| *pref == name)
        .map(|index| index as u32 + 1)
}
