use spritemapper_core::prelude::*;
use spritemapper_core::SpriteMapperError;

fn sprites(sizes: &[(u32, u32)]) -> Vec<Sprite> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| Sprite::new(format!("s{i}"), w, h))
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

#[test]
fn two_sprites_share_one_row() {
    let mut s = sprites(&[(10, 10), (10, 10)]);
    let pages = ShelfLayouter::new().layout(20, 0, 0, &mut s).expect("layout");
    assert_eq!(pages, 1);
    assert_eq!((s[0].rect.x, s[0].rect.y), (0, 0));
    assert_eq!((s[1].rect.x, s[1].rect.y), (10, 0));
    assert!(!s[0].rect.collides(&s[1].rect));
}

#[test]
fn too_wide_sprite_is_rotated_by_every_engine() {
    for mut engine in all_engines() {
        let mut s = sprites(&[(15, 5)]);
        let pages = engine.layout(10, 0, 0, &mut s).expect("layout");
        assert_eq!(pages, 1, "{engine}");
        assert!(s[0].rotated, "{engine}");
        assert_eq!((s[0].w(), s[0].h()), (5, 15), "{engine}");
    }
}

#[test]
fn oversized_sprite_fails_every_engine() {
    for mut engine in all_engines() {
        let mut s = sprites(&[(30, 30)]);
        let err = engine.layout(10, 10, 0, &mut s).unwrap_err();
        assert!(
            matches!(err, SpriteMapperError::NoFreeSpace { ref name, .. } if name == "s0"),
            "{engine}: {err}"
        );
    }
}

#[test]
fn oversized_sprite_yields_zero_pages_through_single_engine_selector() {
    let mut opt = OptimalLayouter::new();
    opt.push(ShelfLayouter::new());
    let mut s = sprites(&[(30, 30)]);
    let pages = opt.layout(10, 10, 0, &mut s).expect("swallowed");
    assert_eq!(pages, 0);
    assert!(opt.last_used().is_none());
}

#[test]
fn five_squares_split_two_two_one() {
    for mut engine in all_engines() {
        let mut s = sprites(&[(10, 10); 5]);
        let pages = engine.layout(10, 25, 0, &mut s).expect("layout");
        assert_eq!(pages, 3, "{engine}");
        let assigned: Vec<Option<usize>> = s.iter().map(|x| x.page).collect();
        assert_eq!(
            assigned,
            vec![Some(0), Some(0), Some(1), Some(1), Some(2)],
            "{engine}"
        );
    }
}

#[test]
fn empty_input_has_no_pages() {
    for mut engine in all_engines() {
        let mut s: Vec<Sprite> = Vec::new();
        assert_eq!(engine.layout(10, 10, 0, &mut s).expect("layout"), 0);
    }
}

#[test]
fn zero_area_sprites_take_no_space() {
    for mut engine in all_engines() {
        let mut s = sprites(&[(10, 10), (0, 0), (10, 10)]);
        let pages = engine.layout(20, 10, 0, &mut s).expect("layout");
        assert_eq!(pages, 1, "{engine}");
        assert_eq!(s[1].page, Some(0));
        assert_eq!((s[1].rect.x, s[1].rect.y), (0, 0));
        assert!(!s[0].rect.collides(&s[2].rect), "{engine}");
    }
}
