//! Drawn placeholder avatars for a fresh install.
//!
//! Each avatar is a 400x600 figure: a head, a body coloured by attire and
//! hair shaped by gender, on a background tinted by gender.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};

use crate::remote::{Attire, Gender};

use super::catalog::AvatarCatalog;
use super::AssetError;

pub const AVATAR_WIDTH: u32 = 400;
pub const AVATAR_HEIGHT: u32 = 600;

const SKIN: Rgba<u8> = Rgba([255, 224, 189, 255]);
const HAIR: Rgba<u8> = Rgba([50, 30, 0, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TIE: Rgba<u8> = Rgba([150, 0, 0, 255]);

/// Write one avatar per known gender × attire plus `default.png` into `dir`.
/// Returns the written paths.
pub fn generate_placeholders(dir: &Path) -> Result<Vec<PathBuf>, AssetError> {
    std::fs::create_dir_all(dir).map_err(|source| AssetError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    for gender in [Gender::Male, Gender::Female] {
        for attire in [Attire::Suit, Attire::Traditional, Attire::Shirt] {
            let path = dir.join(AvatarCatalog::file_name(&gender, &attire));
            save(&draw_avatar(Some(&gender), Some(&attire)), &path)?;
            written.push(path);
        }
    }

    let path = dir.join("default.png");
    save(&draw_avatar(None, None), &path)?;
    written.push(path);

    log::info!("assets: wrote {} avatar(s) to {}", written.len(), dir.display());
    Ok(written)
}

fn save(img: &RgbaImage, path: &Path) -> Result<(), AssetError> {
    img.save(path).map_err(|source| AssetError::Write {
        path: path.to_path_buf(),
        source,
    })
}

fn draw_avatar(gender: Option<&Gender>, attire: Option<&Attire>) -> RgbaImage {
    let background = match gender {
        Some(Gender::Female) => Rgba([252, 231, 243, 255]),
        _ => Rgba([226, 232, 240, 255]),
    };
    let mut img = RgbaImage::from_pixel(AVATAR_WIDTH, AVATAR_HEIGHT, background);

    // long hair sits behind the head and shoulders
    if matches!(gender, Some(Gender::Female)) {
        fill_rect(&mut img, (130, 120), (270, 250), HAIR);
    }

    let body = match attire {
        Some(Attire::Suit) => Rgba([50, 50, 80, 255]),
        Some(Attire::Traditional) => Rgba([170, 60, 40, 255]),
        Some(Attire::Shirt) => Rgba([100, 150, 200, 255]),
        _ => Rgba([200, 200, 200, 255]),
    };
    fill_rect(&mut img, (100, 220), (300, 600), body);

    match attire {
        Some(Attire::Suit) => {
            fill_triangle(&mut img, [(150, 220), (250, 220), (200, 300)], WHITE);
            fill_triangle(&mut img, [(190, 220), (210, 220), (200, 300)], TIE);
        }
        Some(Attire::Traditional) => {
            fill_rect(&mut img, (190, 220), (210, 600), Rgba([230, 180, 60, 255]));
        }
        _ => {}
    }

    fill_ellipse(&mut img, (140, 100), (260, 220), SKIN);

    if matches!(gender, Some(Gender::Male)) {
        fill_rect(&mut img, (145, 100), (255, 125), HAIR);
    }
    img
}

fn fill_rect(img: &mut RgbaImage, from: (u32, u32), to: (u32, u32), color: Rgba<u8>) {
    for y in from.1..to.1.min(img.height()) {
        for x in from.0..to.0.min(img.width()) {
            img.put_pixel(x, y, color);
        }
    }
}

fn fill_ellipse(img: &mut RgbaImage, from: (u32, u32), to: (u32, u32), color: Rgba<u8>) {
    let cx = (from.0 + to.0) as f32 / 2.0;
    let cy = (from.1 + to.1) as f32 / 2.0;
    let rx = (to.0 - from.0) as f32 / 2.0;
    let ry = (to.1 - from.1) as f32 / 2.0;

    for y in from.1..to.1.min(img.height()) {
        for x in from.0..to.0.min(img.width()) {
            let dx = (x as f32 + 0.5 - cx) / rx;
            let dy = (y as f32 + 0.5 - cy) / ry;
            if dx * dx + dy * dy <= 1.0 {
                img.put_pixel(x, y, color);
            }
        }
    }
}

fn fill_triangle(img: &mut RgbaImage, corners: [(u32, u32); 3], color: Rgba<u8>) {
    let [a, b, c] = corners.map(|(x, y)| (x as f32, y as f32));
    let edge = |p: (f32, f32), q: (f32, f32), r: (f32, f32)| {
        (q.0 - p.0) * (r.1 - p.1) - (q.1 - p.1) * (r.0 - p.0)
    };

    let min_x = corners.iter().map(|p| p.0).min().unwrap_or(0);
    let max_x = corners.iter().map(|p| p.0).max().unwrap_or(0);
    let min_y = corners.iter().map(|p| p.1).min().unwrap_or(0);
    let max_y = corners.iter().map(|p| p.1).max().unwrap_or(0);

    for y in min_y..max_y.min(img.height()) {
        for x in min_x..max_x.min(img.width()) {
            let p = (x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge(b, c, p);
            let w1 = edge(c, a, p);
            let w2 = edge(a, b, p);
            let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
            if inside {
                img.put_pixel(x, y, color);
            }
        }
    }
}
