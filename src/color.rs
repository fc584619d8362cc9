use std::fmt;

/// Straight (non-premultiplied) colour with 0..255 channels and 0..1 alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32, g as f32, b as f32, 1.0)
    }

    pub const fn white(a: f32) -> Self {
        Self::new(255.0, 255.0, 255.0, a)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn lerp(a: Rgba, b: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        Rgba {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }

    pub fn to_u8(self) -> [u8; 3] {
        let q = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Parse `r,g,b`, `r,g,b,a` or `#rrggbb` / `#rrggbbaa`.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let s = raw.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        let parts = s.split(',').map(str::trim).collect::<Vec<_>>();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(format!("expected r,g,b[,a] or #rrggbb, got {raw:?}"));
        }
        let mut ch = [0.0f32; 3];
        for (i, p) in parts.iter().take(3).enumerate() {
            let v = p
                .parse::<u8>()
                .map_err(|_| format!("channel {p:?} must be 0..255"))?;
            ch[i] = v as f32;
        }
        let a = match parts.get(3) {
            Some(p) => {
                let v = p
                    .parse::<f32>()
                    .map_err(|_| format!("alpha {p:?} must be a number"))?;
                if !(0.0..=1.0).contains(&v) {
                    return Err(format!("alpha {v} outside 0..1"));
                }
                v
            }
            None => 1.0,
        };
        Ok(Self::new(ch[0], ch[1], ch[2], a))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_u8();
        write!(f, "{r},{g},{b},{}", self.a)
    }
}

fn parse_hex(hex: &str) -> Result<Rgba, String> {
    if hex.len() != 6 && hex.len() != 8 {
        return Err(format!("hex colour must have 6 or 8 digits, got {}", hex.len()));
    }
    let byte = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|d| u8::from_str_radix(d, 16).ok())
            .ok_or_else(|| format!("invalid hex digits in #{hex}"))
    };
    let a = if hex.len() == 8 {
        byte(6)? as f32 / 255.0
    } else {
        1.0
    };
    Ok(Rgba::new(byte(0)? as f32, byte(2)? as f32, byte(4)? as f32, a))
}

/// Hue in degrees (unbounded), saturation and lightness in percent, alpha 0..1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsla {
    pub h: f32,
    pub s: f32,
    pub l: f32,
    pub a: f32,
}

impl Hsla {
    pub const fn new(h: f32, s: f32, l: f32, a: f32) -> Self {
        Self { h, s, l, a }
    }

    pub fn opaque(self) -> Self {
        Self { a: 1.0, ..self }
    }

    /// Hue is wrapped into [0, 360) here and nowhere else.
    pub fn to_rgba(self) -> Rgba {
        let h = self.h.rem_euclid(360.0) / 360.0;
        let s = (self.s / 100.0).clamp(0.0, 1.0);
        let l = (self.l / 100.0).clamp(0.0, 1.0);
        if s <= 0.0 {
            let v = l * 255.0;
            return Rgba::new(v, v, v, self.a.clamp(0.0, 1.0));
        }
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Rgba::new(
            hue_channel(p, q, h + 1.0 / 3.0) * 255.0,
            hue_channel(p, q, h) * 255.0,
            hue_channel(p, q, h - 1.0 / 3.0) * 255.0,
            self.a.clamp(0.0, 1.0),
        )
    }
}

fn hue_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
