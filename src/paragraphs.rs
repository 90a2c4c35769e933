use rand::{rngs::StdRng, Rng, SeedableRng};

/// Built-in practice paragraphs
pub const PARAGRAPHS: [&str; 10] = [
    "The quick brown fox jumps over the lazy dog. This pangram sentence contains every letter of the alphabet at least once, making it perfect for typing practice and testing keyboard skills effectively.",
    "Technology has revolutionized the way we communicate and work. From smartphones to artificial intelligence, modern innovations continue to shape our daily lives in ways we never imagined possible.",
    "Learning to type efficiently is an essential skill in today's digital world. With consistent practice and proper technique, anyone can improve their typing speed and accuracy significantly.",
    "The sun rises in the east and sets in the west, creating beautiful patterns of light and shadow across the landscape. Nature provides endless inspiration for artists and writers alike.",
    "Reading books expands our knowledge and improves our vocabulary. Whether fiction or non-fiction, each book offers unique perspectives and valuable insights into different subjects.",
    "Exercise is crucial for maintaining good health and wellbeing. Regular physical activity helps strengthen muscles, improve cardiovascular health, and boost mental clarity and focus.",
    "Music has the power to evoke emotions and bring people together across cultures. From classical symphonies to modern pop songs, every genre offers something unique to listeners.",
    "Cooking is both an art and a science that brings joy to many. Following recipes carefully while adding personal touches creates delicious meals that friends and family will love.",
    "Travel broadens the mind and creates lasting memories. Exploring new places, trying different foods, and meeting diverse people enriches our understanding of the world.",
    "Time management skills are essential for success in both personal and professional life. Prioritizing tasks, setting realistic goals, and avoiding procrastination lead to better productivity.",
];

/// Random paragraph selection that never hands out the same paragraph twice in a row
#[derive(Debug)]
pub struct ParagraphPicker {
    rng: StdRng,
    last: Option<usize>,
}

impl ParagraphPicker {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            last: None,
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            last: None,
        }
    }

    pub fn next_paragraph(&mut self) -> &'static str {
        let mut idx = self.rng.gen_range(0..PARAGRAPHS.len());
        if Some(idx) == self.last {
            idx = (idx + 1) % PARAGRAPHS.len();
        }
        self.last = Some(idx);
        PARAGRAPHS[idx]
    }
}

impl Default for ParagraphPicker {
    fn default() -> Self {
        Self::new()
    }
}
