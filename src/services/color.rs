// src/services/color.rs
//
// Derivação de cores: conversões de espaço de cor, tints/shades,
// rampa de neutros e pares "container". Tudo puro e determinístico.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// `#rrggbb` ou `rrggbb`, sem diferenciar maiúsculas.
pub static HEX_COLOR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^#?[0-9a-f]{6}$").expect("regex de cor hex inválida"));

pub const DEFAULT_TINTS: [u8; 3] = [60, 40, 20];
pub const DEFAULT_SHADES: [u8; 3] = [20, 40, 60];
pub const CONTAINER_BLEND: u8 = 60;

/// Níveis da escala de brilho (1 = preto, 11 = branco).
pub const BRIGHTNESS_LEVELS: std::ops::RangeInclusive<u8> = 1..=11;
const FALLBACK_BRIGHTNESS: u8 = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("cor hexadecimal inválida: '{0}'")]
    InvalidHex(String),
    #[error("percentual fora do intervalo 0..=100: {0}")]
    PercentOutOfRange(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn parse(hex: &str) -> Option<Self> {
        if !HEX_COLOR_REGEX.is_match(hex) {
            return None;
        }
        let digits = hex.trim_start_matches('#');
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();

        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    pub fn grey(value: u8) -> Self {
        Self {
            r: value,
            g: value,
            b: value,
        }
    }

    /// Sempre minúsculo, dois dígitos por canal.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn map(self, f: impl Fn(u8) -> u8) -> Self {
        Self {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
        }
    }

    fn unit(self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }
}

fn to_byte(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn percent(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

// =============================================================================
//  CONVERSÕES
// =============================================================================

pub fn hex_to_rgb(hex: &str) -> Option<String> {
    let Rgb { r, g, b } = Rgb::parse(hex)?;
    Some(format!("rgb({r}, {g}, {b})"))
}

pub fn hex_to_hsl(hex: &str) -> Option<String> {
    let (r, g, b) = Rgb::parse(hex)?.unit();

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    let (h, s) = if max == min {
        (0.0, 0.0)
    } else {
        let d = max - min;
        let s = if l > 0.5 {
            d / (2.0 - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (h / 6.0, s)
    };

    Some(format!(
        "hsl({}, {}%, {}%)",
        (h * 360.0).round() as i64,
        percent(s),
        percent(l)
    ))
}

pub fn hex_to_cmyk(hex: &str) -> Option<String> {
    let (r, g, b) = Rgb::parse(hex)?.unit();

    let k = 1.0 - r.max(g).max(b);
    // Preto puro: evita divisão por zero
    let (c, m, y) = if k >= 1.0 {
        (0.0, 0.0, 0.0)
    } else {
        (
            (1.0 - r - k) / (1.0 - k),
            (1.0 - g - k) / (1.0 - k),
            (1.0 - b - k) / (1.0 - k),
        )
    };

    Some(format!(
        "cmyk({}%, {}%, {}%, {}%)",
        percent(c),
        percent(m),
        percent(y),
        percent(k)
    ))
}

// =============================================================================
//  TINTS E SHADES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TintsAndShades {
    pub tints: Vec<String>,
    pub shades: Vec<String>,
}

fn check_percents(percents: &[u8]) -> Result<(), ColorError> {
    match percents.iter().find(|p| **p > 100) {
        Some(p) => Err(ColorError::PercentOutOfRange(*p)),
        None => Ok(()),
    }
}

pub fn tint(base: Rgb, pct: u8) -> Rgb {
    let f = f64::from(pct) / 100.0;
    base.map(|c| to_byte(f64::from(c) + (255.0 - f64::from(c)) * f))
}

pub fn shade(base: Rgb, pct: u8) -> Rgb {
    let f = f64::from(pct) / 100.0;
    base.map(|c| to_byte(f64::from(c) * (1.0 - f)))
}

/// Tints interpolam cada canal em direção a 255; shades escalam em direção a 0.
/// A ordem de saída segue a ordem dos percentuais recebidos.
pub fn generate_tints_and_shades(
    hex: &str,
    tint_percents: &[u8],
    shade_percents: &[u8],
) -> Result<TintsAndShades, ColorError> {
    let base = Rgb::parse(hex).ok_or_else(|| ColorError::InvalidHex(hex.to_string()))?;
    check_percents(tint_percents)?;
    check_percents(shade_percents)?;

    Ok(TintsAndShades {
        tints: tint_percents.iter().map(|p| tint(base, *p).to_hex()).collect(),
        shades: shade_percents.iter().map(|p| shade(base, *p).to_hex()).collect(),
    })
}

// =============================================================================
//  RAMPA DE NEUTROS
// =============================================================================

/// Luminância perceptual mapeada para a escala 1..=11. Entrada inválida vira 6.
pub fn analyze_brightness(hex: &str) -> u8 {
    let Some(Rgb { r, g, b }) = Rgb::parse(hex) else {
        return FALLBACK_BRIGHTNESS;
    };
    let luminance =
        (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)) / 255.0;

    (luminance * 10.0).round() as u8 + 1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GreyShade {
    pub level: u8,
    pub hex: String,
}

/// Cinza de um nível: brilho `(level - 1) * 10%`, com R = G = B.
pub fn grey_for_level(level: u8) -> Rgb {
    let brightness = f64::from(level.saturating_sub(1)) / 10.0;
    Rgb::grey(to_byte(brightness * 255.0))
}

/// Preenche apenas os níveis que ainda não existem em `existing_levels`.
pub fn generate_grey_shades(existing_levels: &[u8]) -> Vec<GreyShade> {
    BRIGHTNESS_LEVELS
        .filter(|level| !existing_levels.contains(level))
        .map(|level| GreyShade {
            level,
            hex: grey_for_level(level).to_hex(),
        })
        .collect()
}

// =============================================================================
//  CONTAINER / ON-CONTAINER
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContainerColors {
    pub container: String,
    pub on_container: String,
}

pub fn generate_container_colors(base: &str) -> Result<ContainerColors, ColorError> {
    let TintsAndShades { tints, shades } =
        generate_tints_and_shades(base, &[CONTAINER_BLEND], &[CONTAINER_BLEND])?;

    match (tints.into_iter().next(), shades.into_iter().next()) {
        (Some(container), Some(on_container)) => Ok(ContainerColors {
            container,
            on_container,
        }),
        _ => Err(ColorError::InvalidHex(base.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn converts_known_colors() {
        assert_eq!(hex_to_rgb("#1A73E8").as_deref(), Some("rgb(26, 115, 232)"));
        assert_eq!(hex_to_rgb("ff0000").as_deref(), Some("rgb(255, 0, 0)"));
        assert_eq!(hex_to_hsl("#ff0000").as_deref(), Some("hsl(0, 100%, 50%)"));
        assert_eq!(hex_to_hsl("#00ff00").as_deref(), Some("hsl(120, 100%, 50%)"));
        assert_eq!(hex_to_hsl("#0000ff").as_deref(), Some("hsl(240, 100%, 50%)"));
        assert_eq!(hex_to_cmyk("#ff0000").as_deref(), Some("cmyk(0%, 100%, 100%, 0%)"));
    }

    #[test]
    fn grey_has_no_hue_or_saturation() {
        assert_eq!(hex_to_hsl("#808080").as_deref(), Some("hsl(0, 0%, 50%)"));
        assert_eq!(hex_to_hsl("#ffffff").as_deref(), Some("hsl(0, 0%, 100%)"));
    }

    #[test]
    fn pure_black_cmyk_avoids_division_by_zero() {
        assert_eq!(hex_to_cmyk("#000000").as_deref(), Some("cmyk(0%, 0%, 0%, 100%)"));
    }

    #[test]
    fn rejects_malformed_hex() {
        for bad in ["", "#fff", "#12345", "#1234567", "#gggggg", "##123456", "12 456", "rgb(0,0,0)"] {
            assert_eq!(hex_to_rgb(bad), None, "{bad}");
            assert_eq!(hex_to_hsl(bad), None, "{bad}");
            assert_eq!(hex_to_cmyk(bad), None, "{bad}");
        }
    }

    #[test]
    fn black_tints_brighten_and_shades_stay_black() {
        let out = generate_tints_and_shades("#000000", &DEFAULT_TINTS, &DEFAULT_SHADES).unwrap();
        assert_eq!(out.tints, vec!["#999999", "#666666", "#333333"]);
        assert!(out.shades.iter().all(|s| s == "#000000"));
    }

    #[test]
    fn white_tints_stay_white_and_shades_darken() {
        let out = generate_tints_and_shades("#FFFFFF", &DEFAULT_TINTS, &DEFAULT_SHADES).unwrap();
        assert!(out.tints.iter().all(|t| t == "#ffffff"));
        assert_eq!(out.shades, vec!["#cccccc", "#999999", "#666666"]);
    }

    #[test]
    fn zero_percent_returns_the_base() {
        let out = generate_tints_and_shades("#1A73E8", &[0], &[0]).unwrap();
        assert_eq!(out.tints, vec!["#1a73e8"]);
        assert_eq!(out.shades, vec!["#1a73e8"]);
    }

    #[test]
    fn invalid_input_is_reported() {
        assert_eq!(
            generate_tints_and_shades("blue", &DEFAULT_TINTS, &DEFAULT_SHADES),
            Err(ColorError::InvalidHex("blue".into()))
        );
        assert_eq!(
            generate_tints_and_shades("#000000", &[120], &[]),
            Err(ColorError::PercentOutOfRange(120))
        );
    }

    #[test]
    fn brightness_boundaries() {
        assert_eq!(analyze_brightness("#000000"), 1);
        assert_eq!(analyze_brightness("#ffffff"), 11);
        assert_eq!(analyze_brightness("#808080"), 6);
        assert_eq!(analyze_brightness("not-a-color"), 6);
    }

    #[test]
    fn grey_ramp_fills_every_level_when_empty() {
        let shades = generate_grey_shades(&[]);
        assert_eq!(shades.len(), 11);
        assert_eq!(shades.first().unwrap().hex, "#000000");
        assert_eq!(shades.last().unwrap().hex, "#ffffff");
        assert_eq!(shades[5], GreyShade { level: 6, hex: "#808080".into() });
    }

    #[test]
    fn grey_ramp_skips_existing_levels() {
        let all: Vec<u8> = BRIGHTNESS_LEVELS.collect();
        assert!(generate_grey_shades(&all).is_empty());

        let levels: Vec<u8> = generate_grey_shades(&[1, 6, 11]).iter().map(|s| s.level).collect();
        assert_eq!(levels, vec![2, 3, 4, 5, 7, 8, 9, 10]);
    }

    #[test]
    fn container_pair_uses_sixty_percent_blend() {
        let pair = generate_container_colors("#000000").unwrap();
        assert_eq!(pair.container, "#999999");
        assert_eq!(pair.on_container, "#000000");

        let pair = generate_container_colors("#1a73e8").unwrap();
        assert_eq!(pair.container, tint(Rgb::parse("#1a73e8").unwrap(), 60).to_hex());
        assert_eq!(pair.on_container, shade(Rgb::parse("#1a73e8").unwrap(), 60).to_hex());
    }

    proptest! {
        #[test]
        fn prop_valid_hex_always_converts(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), hash in any::<bool>(), upper in any::<bool>()) {
            let mut hex = format!("{r:02x}{g:02x}{b:02x}");
            if upper { hex = hex.to_uppercase(); }
            if hash { hex.insert(0, '#'); }

            prop_assert_eq!(hex_to_rgb(&hex), Some(format!("rgb({r}, {g}, {b})")));
            prop_assert!(hex_to_hsl(&hex).is_some());
            prop_assert!(hex_to_cmyk(&hex).is_some());
            prop_assert!(BRIGHTNESS_LEVELS.contains(&analyze_brightness(&hex)));
        }

        #[test]
        fn prop_non_matching_strings_yield_none(s in "\\PC*") {
            prop_assume!(!HEX_COLOR_REGEX.is_match(&s));
            prop_assert_eq!(hex_to_rgb(&s), None);
            prop_assert_eq!(hex_to_hsl(&s), None);
            prop_assert_eq!(hex_to_cmyk(&s), None);
        }

        #[test]
        fn prop_tints_never_darken_and_shades_never_brighten(r in any::<u8>(), g in any::<u8>(), b in any::<u8>(), p in 0u8..=100) {
            let base = Rgb { r, g, b };
            let t = tint(base, p);
            let s = shade(base, p);
            prop_assert!(t.r >= r && t.g >= g && t.b >= b);
            prop_assert!(s.r <= r && s.g <= g && s.b <= b);
        }
    }
}
