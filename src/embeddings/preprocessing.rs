// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for the CLIP ViT-B-32 vision tower

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::{stack, Array3, Array4, ArrayView3, Axis};

/// Square input resolution of ViT-B-32
pub const CLIP_INPUT_SIZE: u32 = 224;

/// CLIP normalization mean values (OpenAI CLIP / OpenCLIP)
pub const CLIP_MEAN: [f32; 3] = [0.48145466, 0.4578275, 0.40821073];

/// CLIP normalization std values
pub const CLIP_STD: [f32; 3] = [0.26862954, 0.26130258, 0.27577711];

/// Preprocess an image for the CLIP vision tower
///
/// Steps:
/// 1. Resize so the shortest side is CLIP_INPUT_SIZE (bicubic)
/// 2. Center crop to CLIP_INPUT_SIZE x CLIP_INPUT_SIZE
/// 3. Normalize: (pixel/255 - mean) / std
/// 4. Lay out as CHW [3, H, W]
pub fn preprocess_clip(image: &DynamicImage) -> Array3<f32> {
    let cropped = resize_and_center_crop(image, CLIP_INPUT_SIZE);
    let rgb = cropped.to_rgb8();

    let size = CLIP_INPUT_SIZE as usize;
    let mut tensor = Array3::zeros((3, size, size));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[c, y as usize, x as usize]] =
                (pixel[c] as f32 / 255.0 - CLIP_MEAN[c]) / CLIP_STD[c];
        }
    }

    tensor
}

/// Resize the shortest side to `target_size`, then crop the center square
pub fn resize_and_center_crop(image: &DynamicImage, target_size: u32) -> DynamicImage {
    let (orig_w, orig_h) = image.dimensions();

    if orig_w == 0 || orig_h == 0 {
        return DynamicImage::ImageRgb8(RgbImage::from_pixel(
            target_size,
            target_size,
            Rgb([0, 0, 0]),
        ));
    }

    let scale = target_size as f32 / orig_w.min(orig_h) as f32;
    let new_w = ((orig_w as f32 * scale).round() as u32).max(target_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).max(target_size);

    let resized = image.resize_exact(new_w, new_h, FilterType::CatmullRom);

    let crop_x = (new_w - target_size) / 2;
    let crop_y = (new_h - target_size) / 2;
    resized.crop_imm(crop_x, crop_y, target_size, target_size)
}

/// Stacks per-image CHW tensors into one NCHW batch
pub fn stack_batch(tensors: &[Array3<f32>]) -> Result<Array4<f32>> {
    if tensors.is_empty() {
        anyhow::bail!("Cannot stack an empty image batch");
    }
    let views: Vec<ArrayView3<f32>> = tensors.iter().map(|t| t.view()).collect();
    stack(Axis(0), &views).context("Image tensors have mismatched shapes")
}
