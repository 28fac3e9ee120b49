//! Prompt templates
//!
//! One fixed template per kind. Each embeds the sampled rows as compact JSON
//! and spells out the exact JSON shape the reply must use, so the decoded
//! reply can be handed to callers without reshaping.

use crate::kind::AnalysisKind;

const DATA_SLOT: &str = "{data}";

const POSITIONING_MATRIX: &str = r#"Analyze the following business data and create a Boston Matrix analysis.
Categorize each product into one of the four quadrants: Stars, Cash Cows, Question Marks, or Dogs.
For each product, provide a brief explanation of why it belongs in that category.

Market Data:
{data}

Format the response as a JSON object with the following structure:
{
  "summary": "Overall analysis summary of the market",
  "items": [
    {
      "name": "Product Name",
      "category": "star|cashCow|questionMark|dog",
      "marketGrowth": "high|low",
      "marketShare": "high|low",
      "explanation": "Brief explanation"
    }
  ],
  "recommendations": {
    "stars": ["Recommendation 1", "Recommendation 2"],
    "cashCows": ["Recommendation 1", "Recommendation 2"],
    "questionMarks": ["Recommendation 1", "Recommendation 2"],
    "dogs": ["Recommendation 1", "Recommendation 2"]
  }
}"#;

const NICHE_MARKET: &str = r#"Analyze the following business data and identify potential niche markets.
Focus on products with high ratings and positive reviews but potentially lower market share.

Market Data:
{data}

Format the response as a JSON object with the following structure:
{
  "summary": "Overall niche market opportunities",
  "nicheMarkets": [
    {
      "name": "Niche Market Name",
      "products": ["Product 1", "Product 2"],
      "targetAudience": "Description of target audience",
      "growthPotential": "high|medium|low",
      "competitionLevel": "high|medium|low",
      "entryBarriers": ["Barrier 1", "Barrier 2"],
      "marketingStrategies": ["Strategy 1", "Strategy 2"]
    }
  ],
  "recommendations": [
    "Recommendation 1",
    "Recommendation 2"
  ]
}"#;

const PRODUCT_PROTOTYPE: &str = r#"Analyze the following business data and create product prototype suggestions.
Focus on gaps in the market and opportunities for new products.

Market Data:
{data}

Format the response as a JSON object with the following structure:
{
  "summary": "Overall product opportunities in the market",
  "prototypes": [
    {
      "name": "Product Name",
      "description": "Detailed description of the product",
      "targetMarket": "Description of target market",
      "keyFeatures": ["Feature 1", "Feature 2"],
      "valueProposition": "Unique value proposition",
      "pricingStrategy": "Suggested pricing approach",
      "developmentConsiderations": ["Consideration 1", "Consideration 2"]
    }
  ],
  "recommendations": [
    "Recommendation 1",
    "Recommendation 2"
  ]
}"#;

const QUESTION_TO_STAR: &str = r#"Analyze the following business data and identify Question Mark products that could be converted to Stars.
Provide strategies for this conversion.

Market Data:
{data}

Format the response as a JSON object with the following structure:
{
  "summary": "Overview of Question Mark to Star conversion opportunities",
  "questionMarkProducts": [
    {
      "name": "Product Name",
      "currentStatus": {
        "marketShare": "low",
        "marketGrowth": "high",
        "challenges": ["Challenge 1", "Challenge 2"]
      },
      "conversionStrategies": ["Strategy 1", "Strategy 2"],
      "investmentRequired": "high|medium|low",
      "timelineToStar": "short|medium|long",
      "riskAssessment": "high|medium|low"
    }
  ],
  "generalStrategies": [
    "Strategy 1",
    "Strategy 2"
  ]
}"#;

impl AnalysisKind {
    /// Prompt template with a `{data}` slot
    #[must_use]
    pub fn template(self) -> &'static str {
        match self {
            Self::PositioningMatrix => POSITIONING_MATRIX,
            Self::NicheMarket => NICHE_MARKET,
            Self::ProductPrototype => PRODUCT_PROTOTYPE,
            Self::QuestionToStar => QUESTION_TO_STAR,
        }
    }
}

/// Fill the template for `kind` with the sampled rows
#[must_use]
pub fn render_prompt(kind: AnalysisKind, rows_json: &str) -> String {
    kind.template().replacen(DATA_SLOT, rows_json, 1)
}
