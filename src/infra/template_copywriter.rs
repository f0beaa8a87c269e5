use crate::app::ports::CopywriterPort;
use crate::types::NormalizedJob;

pub const OTHER_CATEGORY: &str = "その他";
const MARKETING_CATEGORY: &str = "マーケティング";

/// Keyword sets per category, matched against the lower-cased title.
/// Earlier categories win ties. A keyword listed twice scores twice.
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "エンジニア",
        &[
            "エンジニア", "engineer", "python", "java", "ruby", "php", "go", "react", "next", "vue",
            "aws", "開発", "技術", "プログラマ", "技術", "テック", "tech", "ai", "機械学習",
        ],
    ),
    (
        "デザイナー",
        &[
            "デザイン", "デザイナー", "design", "ui", "ux", "figma", "adobe", "photoshop",
            "illustrator", "クリエイティブ", "アート", "制作",
        ],
    ),
    (
        MARKETING_CATEGORY,
        &[
            "マーケ", "広報", "sns", "seo", "ads", "広告", "リサーチ", "分析", "ブランディング", "pr",
            "marketing",
        ],
    ),
    (
        "編集/ライター",
        &["編集", "ライター", "writer", "editor", "記事", "執筆", "メディア", "コンテンツ", "書籍"],
    ),
    (
        "企画",
        &[
            "企画", "プランナー", "ディレクター", "pm", "プロダクトマネージャー", "planning",
            "direction", "ディレクション", "事業開発", "プロデュース",
        ],
    ),
    (
        "営業",
        &[
            "営業", "セールス", "sales", "business", "ビジネス", "商談", "アポ",
            "インサイドセールス", "コンサルティング", "提案",
        ],
    ),
];

/// Best-scoring category for a title, or "その他" when nothing matches
pub fn categorize(title: &str) -> &'static str {
    let title = title.to_lowercase();
    let mut best = OTHER_CATEGORY;
    let mut max_score = 0;

    for (name, keywords) in CATEGORIES {
        let mut score = 0;
        for keyword in keywords.iter() {
            if title.contains(keyword) {
                score += 1;
                // the marketing stem outweighs incidental matches like "pr"
                if *name == MARKETING_CATEGORY && *keyword == "マーケ" {
                    score += 2;
                }
            }
        }
        if score > max_score {
            max_score = score;
            best = *name;
        }
    }

    best
}

pub fn message_for(category: &str) -> &'static str {
    match category {
        "エンジニア" => "エンジニアとしてのキャリアは、未経験からの挑戦が最も価値を生む分野の一つです。実践的な開発経験を積むことで、将来の市場価値を大きく高めることができます。",
        "デザイナー" => "デザインのスキルは、座学よりも実際のプロジェクトで磨かれます。クリエイティブな現場での経験は、あなたのポートフォリオをより魅力的なものにするでしょう。",
        "マーケティング" => "マーケティングは、ビジネスの根幹を支える重要なスキルです。数字に基づいた分析や施策の実行経験は、どのような業界でも通用する強力な武器になります。",
        "営業" => "営業力は、すべてのビジネスパーソンにとって不可欠なスキルです。顧客との対話を通じて得られる折衝能力や提案力は、一生モノの財産になります。",
        "企画" => "アイデアを形にする企画職は、ゼロからイチを生み出す楽しさを実感できる仕事です。プロジェクトを推進する力は、将来のリーダーシップにつながります。",
        "編集/ライター" => "言葉で情報を伝える力は、AI時代においても決して色褪せないスキルです。読者の心を動かすコンテンツ作りを通して、発信力を磨きましょう。",
        _ => "未経験から新しい分野に挑戦することは、大きな自己成長のチャンスです。まずは現場に飛び込み、実務を通してスキルを身につけていきましょう。",
    }
}

/// Fixed-template copywriter keyed by job category
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateCopywriter;

impl CopywriterPort for TemplateCopywriter {
    fn recommend(&self, job: &NormalizedJob) -> Option<String> {
        Some(message_for(categorize(&job.title)).to_string())
    }
}
