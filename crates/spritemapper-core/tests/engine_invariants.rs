use rand::{Rng, SeedableRng};
use spritemapper_core::prelude::*;

fn random_sprites(seed: u64, n: usize, max_side: u32) -> Vec<Sprite> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let w = rng.gen_range(1..=max_side);
            let h = rng.gen_range(1..=max_side);
            Sprite::new(format!("r{i}"), w, h)
        })
        .collect()
}

fn all_engines() -> Vec<LayoutEngine> {
    let mut engines: Vec<LayoutEngine> = vec![ShelfLayouter::new().into()];
    for chooser in FreeSpaceChooser::ALL {
        for splitter in SplitStrategy::ALL {
            engines.push(GuillotineLayouter::new(chooser, splitter).into());
        }
        engines.push(MaxRectsLayouter::new(chooser).into());
    }
    engines
}

/// True if no two sprites on the same page overlap once `a` is grown by
/// `gap` on every side.
fn separated(sprites: &[Sprite], gap: u32) -> bool {
    for i in 0..sprites.len() {
        for j in (i + 1)..sprites.len() {
            let (a, b) = (&sprites[i], &sprites[j]);
            if a.page != b.page || a.is_empty() || b.is_empty() {
                continue;
            }
            let g = gap as i64;
            let overlap = (a.rect.x as i64 - g) < b.right() as i64
                && (a.right() as i64 + g) > b.rect.x as i64
                && (a.rect.y as i64 - g) < b.bottom() as i64
                && (a.bottom() as i64 + g) > b.rect.y as i64;
            if overlap {
                return false;
            }
        }
    }
    true
}

#[test]
fn placements_are_disjoint_and_in_bounds() {
    let (w, h) = (256, 256);
    for mut engine in all_engines() {
        let mut s = random_sprites(42, 150, 64);
        let pages = engine.layout(w, h, 0, &mut s).expect("layout");
        assert!(pages >= 1, "{engine}");
        for sprite in &s {
            let page = sprite.page.expect("placed");
            assert!(page < pages, "{engine}");
            assert!(sprite.right() <= w, "{engine}: {sprite}");
            assert!(sprite.bottom() <= h, "{engine}: {sprite}");
        }
        assert!(separated(&s, 0), "{engine}");
    }
}

#[test]
fn maxrects_and_shelf_keep_spacing() {
    let spacing = 3;
    let mut engines: Vec<LayoutEngine> = vec![ShelfLayouter::new().into()];
    for chooser in FreeSpaceChooser::ALL {
        engines.push(MaxRectsLayouter::new(chooser).into());
    }
    for mut engine in engines {
        let mut s = random_sprites(7, 80, 48);
        engine.layout(200, 200, spacing, &mut s).expect("layout");
        assert!(separated(&s, spacing), "{engine}");
    }
}

#[test]
fn guillotine_keeps_spacing() {
    for chooser in FreeSpaceChooser::ALL {
        for splitter in SplitStrategy::ALL {
            let mut engine = GuillotineLayouter::new(chooser, splitter);
            let mut s = random_sprites(9, 80, 48);
            engine.layout(200, 200, 2, &mut s).expect("layout");
            assert!(separated(&s, 2), "{chooser} {splitter}");
            assert!(s.iter().all(|x| x.right() <= 200 && x.bottom() <= 200));
        }
    }
}

#[test]
fn repeated_runs_are_identical() {
    for engine in all_engines() {
        let mut a = random_sprites(1234, 100, 40);
        let mut b = a.clone();
        let pa = engine.clone().layout(128, 0, 1, &mut a).expect("layout");
        let pb = engine.clone().layout(128, 0, 1, &mut b).expect("layout");
        assert_eq!(pa, pb, "{engine}");
        for (x, y) in a.iter().zip(&b) {
            assert_eq!((x.rect, x.rotated, x.page), (y.rect, y.rotated, y.page), "{engine}");
        }
    }
}

#[test]
fn unbounded_height_uses_one_page() {
    // Guillotine may strand narrow columns and defer; the other two always
    // keep a full-width region below everything placed.
    let mut engines: Vec<LayoutEngine> = vec![ShelfLayouter::new().into()];
    for chooser in FreeSpaceChooser::ALL {
        engines.push(MaxRectsLayouter::new(chooser).into());
    }
    for mut engine in engines {
        let mut s = random_sprites(5, 60, 32);
        let pages = engine.layout(64, 0, 0, &mut s).expect("layout");
        assert_eq!(pages, 1, "{engine}");
    }
}
