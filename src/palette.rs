use rand::Rng;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Rgb {
    pub(crate) const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear mix from `self` towards `other`; `t` is clamped to 0..=1.
    pub(crate) fn mix(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| -> u8 {
            let v = a as f32 + (b as f32 - a as f32) * t;
            (v.clamp(0.0, 255.0) + 0.5) as u8
        };
        Rgb {
            r: lerp(self.r, other.r),
            g: lerp(self.g, other.g),
            b: lerp(self.b, other.b),
        }
    }
}

/// Dark fill painted over the whole surface every frame.
pub(crate) const BACKDROP: Rgb = Rgb::new(26, 26, 46);

/// Syntax-highlight colors shared by every particle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Swatch {
    Gold,
    Cyan,
    Pink,
    Blue,
    Purple,
    Green,
}

pub(crate) const PALETTE: [Swatch; 6] = [
    Swatch::Gold,
    Swatch::Cyan,
    Swatch::Pink,
    Swatch::Blue,
    Swatch::Purple,
    Swatch::Green,
];

impl Swatch {
    pub(crate) fn rgb(self) -> Rgb {
        match self {
            Swatch::Gold => Rgb::new(255, 215, 0),     // keywords
            Swatch::Cyan => Rgb::new(102, 198, 204),   // functions
            Swatch::Pink => Rgb::new(255, 121, 198),   // strings
            Swatch::Blue => Rgb::new(130, 170, 255),   // variables
            Swatch::Purple => Rgb::new(189, 147, 249), // operators
            Swatch::Green => Rgb::new(80, 250, 123),   // brackets
        }
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Swatch::Gold => "gold",
            Swatch::Cyan => "cyan",
            Swatch::Pink => "pink",
            Swatch::Blue => "blue",
            Swatch::Purple => "purple",
            Swatch::Green => "green",
        }
    }

    pub(crate) fn pick<R: Rng + ?Sized>(rng: &mut R) -> Swatch {
        PALETTE[rng.gen_range(0..PALETTE.len())]
    }
}
