use novade_window_shape::{
    build_bitmap, build_tree, build_tree_with, classify, Classification, MemorySurface,
    PixelAccess, PixelFormat, QuadSplit, Rect, Rgb, Rgba, ShapeMode, ShapeNode, ShapeSurface,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

/// Deterministic noisy surface; `seed` varies the pattern.
///
/// Alpha takes one of four levels on either side of every cutoff used by
/// [`modes`], and a quarter of the pixels carry the color key, so every mode
/// sees a mixed surface.
fn noisy_surface(width: u32, height: u32, seed: u32) -> MemorySurface {
    const ALPHA_LEVELS: [u8; 4] = [0, 40, 100, 255];
    MemorySurface::from_fn(width, height, PixelFormat::Argb8888, |x, y| {
        let h = (x.wrapping_mul(73_856_093)
            ^ y.wrapping_mul(19_349_663)
            ^ seed.wrapping_mul(83_492_791))
        .wrapping_mul(2_654_435_761);
        let alpha = ALPHA_LEVELS[(h >> 24) as usize & 0x3];
        let shade = (h >> 8) as u8 & 0x3;
        Rgba::new(shade * 60, 0, 255 - shade * 60, alpha)
    })
}

/// Pixel grid of opaque blobs that produces deep trees with large uniform leaves.
fn blob_surface(width: u32, height: u32) -> MemorySurface {
    MemorySurface::from_fn(width, height, PixelFormat::Argb8888, |x, y| {
        if (x / 3 + y / 5) % 2 == 0 {
            Rgba::opaque(255, 255, 255)
        } else {
            Rgba::TRANSPARENT
        }
    })
}

fn modes() -> [ShapeMode; 4] {
    [
        ShapeMode::Default,
        ShapeMode::BinarizeAlpha(128),
        ShapeMode::ReverseBinarizeAlpha(64),
        ShapeMode::ColorKey(Rgb::new(0, 0, 255)),
    ]
}

fn coverage_counts(tree_leaves: &[(Rect, bool)], width: u32, height: u32) -> Vec<u32> {
    let mut counts = vec![0u32; (width * height) as usize];
    for (rect, _) in tree_leaves {
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                counts[(y * width + x) as usize] += 1;
            }
        }
    }
    counts
}

#[rstest]
#[case(4, 4)]
#[case(8, 8)]
#[case(6, 10)]
#[case(16, 8)]
#[case(16, 16)]
#[case(30, 18)]
fn leaves_tile_even_surfaces_exactly(#[case] width: u32, #[case] height: u32) {
    let mut splits = vec![QuadSplit::Cover];
    // Half-size quadrants only tile a square power-of-two surface at every level.
    if width == height && width.is_power_of_two() {
        splits.push(QuadSplit::Truncate);
    }
    for split in splits {
        let surface = blob_surface(width, height);
        let tree = build_tree_with(&surface, ShapeMode::Default, split).unwrap();
        assert!(tree.leaf_count() > 1);
        let leaves: Vec<_> = tree.leaves().collect();
        let counts = coverage_counts(&leaves, width, height);
        assert!(
            counts.iter().all(|&c| c == 1),
            "{split:?} {width}x{height} leaves overlap or leave gaps"
        );
    }
}

#[rstest]
#[case(5, 11)]
#[case(7, 2)]
#[case(13, 9)]
#[case(31, 17)]
fn cover_split_tiles_odd_surfaces_exactly(#[case] width: u32, #[case] height: u32) {
    let tree = build_tree(&blob_surface(width, height), ShapeMode::Default).unwrap();
    assert!(tree.leaf_count() > 1);
    let leaves: Vec<_> = tree.leaves().collect();
    assert!(coverage_counts(&leaves, width, height).iter().all(|&c| c == 1));
}

#[rstest]
#[case(9, 7)]
#[case(16, 8)]
fn truncate_split_leaves_gaps_but_never_overlaps(#[case] width: u32, #[case] height: u32) {
    let surface = blob_surface(width, height);
    let tree = build_tree_with(&surface, ShapeMode::Default, QuadSplit::Truncate).unwrap();
    let leaves: Vec<_> = tree.leaves().collect();
    let counts = coverage_counts(&leaves, width, height);
    assert!(counts.iter().all(|&c| c <= 1));
    assert!(counts.iter().any(|&c| c == 0));
}

#[rstest]
#[case(8, 8, 1)]
#[case(12, 6, 2)]
#[case(11, 5, 3)]
fn leaves_agree_with_classifier(#[case] width: u32, #[case] height: u32, #[case] seed: u32) {
    let surface = noisy_surface(width, height, seed);
    let pixels = surface.lock().unwrap();
    for mode in modes() {
        let tree = build_tree(&surface, mode).unwrap();
        assert!(tree.leaf_count() > 1, "mode {mode} saw a uniform surface");
        for (rect, opaque) in tree.leaves() {
            for y in rect.y..rect.bottom() {
                for x in rect.x..rect.right() {
                    assert_eq!(
                        opaque,
                        classify(pixels.pixel(x, y), mode),
                        "mode {mode} at ({x},{y})"
                    );
                }
            }
        }
    }
}

#[rstest]
#[case(8, 8)]
#[case(10, 4)]
#[case(9, 7)]
fn bitmap_agrees_with_tree(#[case] width: u32, #[case] height: u32) {
    let surface = noisy_surface(width, height, 7);
    for mode in modes() {
        let bitmap = build_bitmap(&surface, mode).unwrap();
        let tree = build_tree(&surface, mode).unwrap();
        assert!(tree.leaf_count() > 1, "mode {mode} saw a uniform surface");
        for y in 0..height {
            for x in 0..width {
                assert_eq!(
                    bitmap.is_opaque(x, y),
                    tree.contains_opaque(x, y),
                    "mode {mode} at ({x},{y})"
                );
            }
        }
        let tree_opaque: u64 = tree
            .leaves()
            .filter(|&(_, opaque)| opaque)
            .map(|(rect, _)| rect.area())
            .sum();
        assert_eq!(bitmap.count_opaque() as u64, tree_opaque);
    }
}

#[rstest]
#[case(1, 1, 255)]
#[case(5, 3, 255)]
#[case(64, 64, 255)]
#[case(7, 7, 0)]
#[case(32, 17, 0)]
fn uniform_surfaces_build_a_single_leaf(
    #[case] width: u32,
    #[case] height: u32,
    #[case] alpha: u8,
) {
    let surface = MemorySurface::from_fn(width, height, PixelFormat::Argb8888, |_, _| {
        Rgba::new(10, 20, 30, alpha)
    });
    let tree = build_tree(&surface, ShapeMode::Default).unwrap();
    assert_eq!(tree.node_count(), 1);
    let root = tree.root().and_then(|id| tree.node(id)).unwrap();
    assert_eq!(
        root,
        &ShapeNode::Leaf {
            classification: Classification::from(alpha > 0),
            rect: Rect::new(0, 0, width, height),
        }
    );
}

#[test]
fn checkerboard_splits_into_four_pixels() {
    let surface = MemorySurface::from_rgba(
        2,
        2,
        &[
            Rgba::opaque(0, 0, 0),
            Rgba::TRANSPARENT,
            Rgba::TRANSPARENT,
            Rgba::opaque(0, 0, 0),
        ],
    )
    .unwrap();
    let tree = build_tree(&surface, ShapeMode::Default).unwrap();
    let root = tree.root().and_then(|id| tree.node(id)).unwrap();
    let ShapeNode::Quad(quadrants) = root else {
        panic!("expected a quad root, got {root:?}");
    };
    let children: Vec<_> = quadrants
        .iter()
        .map(|id| tree.node(id).cloned().unwrap())
        .collect();
    let leaf = |classification, x, y| ShapeNode::Leaf {
        classification,
        rect: Rect::new(x, y, 1, 1),
    };
    assert_eq!(
        children,
        vec![
            leaf(Classification::Opaque, 0, 0),
            leaf(Classification::Transparent, 1, 0),
            leaf(Classification::Transparent, 0, 1),
            leaf(Classification::Opaque, 1, 1),
        ]
    );
}

#[test]
fn color_key_cuts_out_only_the_key_pixel() {
    let mut surface = MemorySurface::from_fn(4, 4, PixelFormat::Rgb888, |_, _| {
        Rgba::opaque(255, 0, 0)
    });
    surface.set_pixel(2, 1, Rgba::opaque(0, 0, 0));
    let mode = ShapeMode::ColorKey(Rgb::new(0, 0, 0));

    let tree = build_tree(&surface, mode).unwrap();
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(tree.contains_opaque(x, y), (x, y) != (2, 1), "({x},{y})");
        }
    }
    let bitmap = build_bitmap(&surface, mode).unwrap();
    assert_eq!(bitmap.count_opaque(), 15);
}

#[test]
fn freeing_twice_is_harmless() {
    let mut tree = build_tree(&blob_surface(12, 12), ShapeMode::Default).unwrap();
    assert!(tree.leaf_count() > 1);
    tree.free();
    tree.free();
    assert!(tree.is_freed());
    assert_eq!(tree.leaves().count(), 0);
}
