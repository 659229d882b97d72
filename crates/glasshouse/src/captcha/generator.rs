//! CAPTCHA image generation.
//!
//! Generates text challenges rendered as SVG: noise lines over jittered,
//! rotated glyphs. The answer is compared by exact match at login.

use rand::Rng;

/// Characters drawn in challenges. Ambiguous glyphs (0/O/o, 1/l/I) are
/// left out so the answer stays typeable.
const CHARSET: &[u8] = b"23456789abcdefghjkmnpqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ";

const WIDTH: u32 = 200;
const HEIGHT: u32 = 80;
const NOISE_LINES: u32 = 15;

/// A generated challenge: the answer text and its SVG rendering
#[derive(Debug, Clone)]
pub struct Challenge {
    pub answer: String,
    pub svg: String,
}

/// CAPTCHA generator service
pub struct CaptchaGenerator {
    /// Challenge text length
    pub challenge_len: usize,
}

impl CaptchaGenerator {
    pub fn new(challenge_len: usize) -> Self {
        Self { challenge_len }
    }

    /// Generate a new challenge
    pub fn generate(&self) -> Challenge {
        let mut rng = rand::rng();

        let answer: String = (0..self.challenge_len)
            .map(|_| {
                let idx = rng.random_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect();

        let svg = self.render_svg(&answer);

        Challenge { answer, svg }
    }

    /// Render the challenge text as an SVG image
    fn render_svg(&self, text: &str) -> String {
        let mut rng = rand::rng();

        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
            WIDTH, HEIGHT
        );

        // Background
        svg.push_str(r##"<rect width="100%" height="100%" fill="#1a1a2e"/>"##);

        // Noise lines
        for _ in 0..NOISE_LINES {
            let x1 = rng.random_range(0..WIDTH);
            let y1 = rng.random_range(0..HEIGHT);
            let x2 = rng.random_range(0..WIDTH);
            let y2 = rng.random_range(0..HEIGHT);
            let opacity = rng.random_range(20..50);
            svg.push_str(&format!(
                r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="rgba(255,255,255,0.{})" stroke-width="1"/>"#,
                x1, y1, x2, y2, opacity
            ));
        }

        // Glyphs with per-character jitter and rotation
        let char_width = WIDTH as f32 / (text.len() as f32 + 1.0);
        for (i, c) in text.chars().enumerate() {
            let x = char_width * (i as f32 + 0.8);
            let y = 50 + rng.random_range(-10..10);
            let rotation = rng.random_range(-15..15);
            let color = format!(
                "rgb({},{},{})",
                rng.random_range(150..255),
                rng.random_range(150..255),
                rng.random_range(150..255)
            );

            svg.push_str(&format!(
                r#"<text x="{}" y="{}" font-family="monospace" font-size="32" font-weight="bold" fill="{}" transform="rotate({} {} {})">{}</text>"#,
                x, y, color, rotation, x, y, c
            ));
        }

        svg.push_str("</svg>");
        svg
    }
}
