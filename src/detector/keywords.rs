// Curated harassment/abuse vocabulary and the co-occurrence patterns.
//
// Keywords are matched as plain substrings of the lower-cased text, so a
// short stem like "harass" also matches "harassed" and "harassing". Every
// keyword present counts toward confidence, which means stems and their
// longer phrases ("harassment" + "sexual harassment") both add weight.

/// Literal phrases, grouped by theme. All lower-case.
pub const KEYWORDS: &[&str] = &[
    // Harassment
    "harassment",
    "harass",
    "sexual harassment",
    "online harassment",
    "street harassment",
    "creep",
    "creepy",
    "catcall",
    "unwanted advances",
    "unwelcome advances",
    // Abuse
    "abuse",
    "abused",
    "abusing",
    "abuser",
    "sexual abuse",
    "emotional abuse",
    "verbal abuse",
    "physical abuse",
    "domestic abuse",
    // Violence and assault
    "violence",
    "domestic violence",
    "gender violence",
    "gender-based violence",
    "assault",
    "sexual assault",
    "rape",
    "molest",
    "grope",
    "acid attack",
    "honor killing",
    "femicide",
    // Threats and intimidation
    "threat",
    "death threat",
    "intimidate",
    "intimidation",
    "blackmail",
    "sextortion",
    // Stalking and doxxing
    "stalker",
    "stalking",
    "cyberstalking",
    "doxxing",
    "doxing",
    "doxxed",
    "leaked her address",
    "hidden camera",
    "revenge porn",
    "non-consensual",
    "deepfake",
    // Slurs and misogyny
    "misogyny",
    "misogynist",
    "slut",
    "whore",
    "predator",
    "victim",
    // Body shaming
    "body shaming",
    "body-shaming",
    "fat shaming",
    "fat-shaming",
    // Workplace harassment
    "hostile work environment",
    "quid pro quo",
    "inappropriate touching",
    "sexual misconduct",
    // Cyberbullying
    "cyberbullying",
    "cyberbully",
    "bullying",
    "bullied",
    "hate campaign",
    // Relationship abuse
    "coercive control",
    "gaslighting",
    "intimate partner violence",
    "dating violence",
    "marital rape",
    "battered",
    "dowry",
];

/// Phrases that add a flat confidence bonus when present.
pub const HIGH_PRIORITY_TERMS: &[&str] = &[
    "sexual harassment",
    "domestic violence",
    "gender violence",
    "stalking",
];

/// Co-occurrence patterns, applied to the lower-cased text.
pub const PATTERNS: &[&str] = &[
    r"\b(women?|girls?|female)\s+(harassment|abuse|violence|assault)",
    r"\b(sexual|domestic)\s+(harassment|abuse|violence|assault)",
    r"\b(stalking|harassing|abusing)\s+(women?|girls?|female)",
    r"\b(gender[- ]based|gender)\s+(violence|harassment|abuse)",
    r"\b(workplace|street)\s+(harassment|abuse)",
    r"\b(catcalling|groping|molesting)",
    r"\b(victim\s+of|survivor\s+of)\s+(harassment|abuse|assault)",
];
