use maxpack::{
    Heuristic, InputItem, PackError, PackOutput, PackStatus, PackerConfig, PackingSession, Rect,
    RotationPolicy, SortOrder,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// One `bin:x,y` entry per item, in the order items were added.
fn render(output: &PackOutput) -> String {
    output
        .items()
        .iter()
        .map(|item| match item.placement() {
            Some(placement) => format!(
                "{}:{},{}",
                placement.bin, placement.position.0, placement.position.1
            ),
            None => "-".to_owned(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Checks that placed items stay inside their bins and never overlap.
fn assert_valid_layout(output: &PackOutput) {
    for item in output.items() {
        let rect = match item.rect() {
            Some(rect) => rect,
            None => continue,
        };

        let bin = output.bins()[item.placement().unwrap().bin];
        assert!(
            Rect::from_size(bin.size()).contains(&rect),
            "{} at {:?} escapes bin {:?}",
            item.id(),
            rect,
            bin
        );
    }

    let owners: Vec<_> = output
        .items()
        .iter()
        .filter(|item| item.duplicate_of().is_none())
        .filter_map(|item| Some((item.placement()?.bin, item.rect()?)))
        .collect();

    for (i, (bin_a, a)) in owners.iter().enumerate() {
        for (bin_b, b) in &owners[i + 1..] {
            assert!(
                bin_a != bin_b || !a.intersects(b),
                "{:?} overlaps {:?} in bin {}",
                a,
                b,
                bin_a
            );
        }
    }
}

/// A reproducible spread of item sizes.
fn assorted_sizes(count: usize) -> Vec<(u32, u32)> {
    let mut state: u32 = 0x2545_f491;

    (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;

            (4 + state % 60, 4 + (state >> 8) % 60)
        })
        .collect()
}

#[test]
fn two_squares_share_a_fixed_bin() {
    init_logger();

    let config = PackerConfig::fixed((512, 512)).heuristic(Heuristic::BestAreaFit);
    let mut session = PackingSession::new(config);
    session.add(InputItem::new((100, 100)));
    session.add(InputItem::new((100, 100)));

    let output = session.pack().unwrap();

    assert_eq!(output.status(), PackStatus::Done);
    assert_eq!(output.bins().len(), 1);
    assert_eq!(output.bins()[0].size(), (512, 512));
    insta::assert_snapshot!(render(&output), @"0:0,0 0:100,0");
    assert_valid_layout(&output);
}

#[test]
fn oversized_item_in_fixed_mode_is_reported_missing() {
    init_logger();

    let mut session = PackingSession::new(PackerConfig::fixed((512, 512)));
    let id = session.add(InputItem::new((600, 600)));

    let output = session.pack().unwrap();

    assert_eq!(output.status(), PackStatus::Incomplete { missing: 1 });
    assert!(output.item(id).unwrap().placement().is_none());
    assert!(output.bins().is_empty());
}

#[test]
fn oversized_item_does_not_block_the_rest() {
    let mut session = PackingSession::new(PackerConfig::fixed((128, 128)));
    let big = session.add(InputItem::new((200, 10)));
    let small = session.add(InputItem::new((10, 10)));

    let output = session.pack().unwrap();

    assert_eq!(output.missing(), 1);
    assert!(output.item(big).unwrap().placement().is_none());
    assert!(output.item(small).unwrap().placement().is_some());
    assert_eq!(output.bins().len(), 1);
}

#[test]
fn duplicates_share_their_representatives_placement() {
    init_logger();

    let mut session = PackingSession::new(PackerConfig::fixed((256, 256)));
    let first = session.add(InputItem::new((32, 32)).with_content_hash([9; 32]));
    let other = session.add(InputItem::new((16, 16)));
    let second = session.add(InputItem::new((32, 32)).with_content_hash([9; 32]));

    let output = session.pack().unwrap();

    assert_eq!(session.needed_area(), 32 * 32 + 16 * 16);
    assert_eq!(output.needed_area(), 32 * 32 + 16 * 16);
    assert_eq!(output.merged(), 1);
    assert_eq!(output.status(), PackStatus::Done);

    let first = output.item(first).unwrap();
    let second = output.item(second).unwrap();

    assert_eq!(second.duplicate_of(), Some(first.id()));
    assert_eq!(second.placement(), first.placement());
    assert_ne!(output.item(other).unwrap().placement(), first.placement());
    assert_valid_layout(&output);
}

#[test]
fn auto_grow_doubles_until_the_item_fits() {
    init_logger();

    let config = PackerConfig::new().size((32, 32)).square(true).auto_grow(true);
    let mut session = PackingSession::new(config);
    let id = session.add(InputItem::new((50, 50)));

    let output = session.pack().unwrap();

    assert_eq!(output.bins().len(), 1);
    assert_eq!(output.bins()[0].size(), (64, 64));
    assert_eq!(output.item(id).unwrap().placement().unwrap().position, (0, 0));
}

#[test]
fn non_square_growth_alternates_sides() {
    let config = PackerConfig::new().size((32, 32)).square(false);

    let mut wide = PackingSession::new(config.clone());
    wide.add(InputItem::new((50, 20)));
    assert_eq!(wide.pack().unwrap().bins()[0].size(), (64, 32));

    let mut tall = PackingSession::new(config);
    tall.add(InputItem::new((20, 50)));
    assert_eq!(tall.pack().unwrap().bins()[0].size(), (64, 64));
}

#[test]
fn auto_grow_rejects_items_larger_than_the_ceiling() {
    let config = PackerConfig::new().size((32, 32)).max_size((64, 64));

    let mut session = PackingSession::new(config.clone());
    session.add(InputItem::new((100, 10)));

    match session.pack() {
        Err(PackError::ItemTooLarge { size, max_size, .. }) => {
            assert_eq!(size, (100, 10));
            assert_eq!(max_size, (64, 64));
        }
        other => panic!("expected ItemTooLarge, got {:?}", other),
    }

    let config = config
        .max_size((64, 128))
        .rotation(RotationPolicy::OnlyWhenNeeded);
    let mut session = PackingSession::new(config);
    let id = session.add(InputItem::new((100, 10)));

    let output = session.pack().unwrap();
    assert!(output.item(id).unwrap().rotated());
}

#[test]
fn items_that_fit_upright_are_not_rotated() {
    let config = PackerConfig::fixed((64, 24))
        .heuristic(Heuristic::BestShortSideFit)
        .rotation(RotationPolicy::OnlyWhenNeeded);
    let mut session = PackingSession::new(config);
    let id = session.add(InputItem::new((20, 10)));

    let output = session.pack().unwrap();
    let item = output.item(id).unwrap();

    assert!(!item.rotated());
    assert_eq!(item.size(), (20, 10));
}

#[test]
fn auto_grow_stops_at_the_ceiling() {
    let config = PackerConfig::new().size((32, 32)).max_size((64, 64));
    let mut session = PackingSession::new(config);
    session.add(InputItem::new((60, 60)));
    session.add(InputItem::new((60, 60)));

    match session.pack() {
        Err(PackError::GrowLimitExceeded { size, .. }) => assert_eq!(size, (64, 64)),
        other => panic!("expected GrowLimitExceeded, got {:?}", other),
    }
}

#[test]
fn fixed_mode_opens_new_bins() {
    let mut session = PackingSession::new(PackerConfig::fixed((64, 64)));
    for _ in 0..5 {
        session.add(InputItem::new((64, 64)));
    }

    let output = session.pack().unwrap();

    assert_eq!(output.bins().len(), 5);
    assert_eq!(output.status(), PackStatus::Done);
    insta::assert_snapshot!(render(&output), @"0:0,0 1:0,0 2:0,0 3:0,0 4:0,0");
}

#[test]
fn shrinking_halves_the_last_bin_while_it_fits() {
    init_logger();

    let config = PackerConfig::fixed((512, 512)).shrink(true);
    let mut session = PackingSession::new(config);
    session.add(InputItem::new((100, 100)));

    let output = session.pack().unwrap();

    assert_eq!(output.bins().len(), 1);
    assert_eq!(output.bins()[0].size(), (128, 128));
    assert_valid_layout(&output);
}

#[test]
fn non_square_shrinking_alternates_sides() {
    let config = PackerConfig::fixed((256, 256)).shrink(true).square(false);
    let mut session = PackingSession::new(config);
    session.add(InputItem::new((100, 100)));

    let output = session.pack().unwrap();

    assert_eq!(output.bins()[0].size(), (128, 128));
}

#[test]
fn poorly_filled_bin_is_divided() {
    init_logger();

    let config = PackerConfig::fixed((256, 256))
        .shrink(true)
        .auto_size(true, 0.8);
    let mut session = PackingSession::new(config);
    let a = session.add(InputItem::new((120, 120)));
    let b = session.add(InputItem::new((120, 120)));

    let output = session.pack().unwrap();

    assert_eq!(output.status(), PackStatus::Done);
    assert_eq!(
        output.bins().iter().map(|bin| bin.size()).collect::<Vec<_>>(),
        vec![(128, 128), (128, 128)]
    );
    assert_eq!(output.item(a).unwrap().placement().unwrap().bin, 0);
    assert_eq!(output.item(b).unwrap().placement().unwrap().bin, 1);
    assert!(output.fill_rate() > 0.85);
    assert_valid_layout(&output);
}

#[test]
fn failed_divide_is_rolled_back() {
    let config = PackerConfig::fixed((256, 256))
        .shrink(true)
        .auto_size(true, 0.8);
    let mut session = PackingSession::new(config);
    let id = session.add(InputItem::new((200, 200)));

    let output = session.pack().unwrap();

    assert_eq!(output.bins().len(), 1);
    assert_eq!(output.bins()[0].size(), (256, 256));
    assert_eq!(output.item(id).unwrap().placement().unwrap().bin, 0);
    assert_eq!(output.placed_area(), 200 * 200);
}

#[test]
fn top_left_extends_rows() {
    let config = PackerConfig::fixed((128, 128)).heuristic(Heuristic::TopLeft);
    let mut session = PackingSession::new(config);
    for _ in 0..3 {
        session.add(InputItem::new((64, 32)));
    }

    let output = session.pack().unwrap();

    insta::assert_snapshot!(render(&output), @"0:0,0 0:64,0 0:0,32");
}

#[test]
fn every_configuration_produces_a_valid_layout() {
    init_logger();

    let heuristics = [
        Heuristic::None,
        Heuristic::TopLeft,
        Heuristic::BestAreaFit,
        Heuristic::BestShortSideFit,
        Heuristic::BestLongSideFit,
        Heuristic::MinWidth,
        Heuristic::MinHeight,
    ];
    let rotations = [
        RotationPolicy::Never,
        RotationPolicy::OnlyWhenNeeded,
        RotationPolicy::HeightGreaterThanWidth,
    ];
    let sizes = assorted_sizes(60);

    for &heuristic in &heuristics {
        for &rotation in &rotations {
            for &auto_grow in &[true, false] {
                let config = PackerConfig::new()
                    .size((128, 128))
                    .auto_grow(auto_grow)
                    .heuristic(heuristic)
                    .rotation(rotation)
                    .sort_order(SortOrder::ByMax);

                let mut session = PackingSession::new(config);
                for &size in &sizes {
                    session.add(InputItem::new(size));
                }

                let output = session.pack().unwrap();

                assert_eq!(
                    output.status(),
                    PackStatus::Done,
                    "{:?} / {:?} / auto-grow {}",
                    heuristic,
                    rotation,
                    auto_grow
                );
                assert_valid_layout(&output);
            }
        }
    }
}

#[test]
fn packing_is_deterministic() {
    let sizes = assorted_sizes(40);
    let config = PackerConfig::new()
        .size((64, 64))
        .auto_grow(false)
        .rotation(RotationPolicy::OnlyWhenNeeded);

    let run = || {
        let mut session = PackingSession::new(config.clone());
        for &size in &sizes {
            session.add(InputItem::new(size));
        }
        render(&session.pack().unwrap())
    };

    assert_eq!(run(), run());
}

#[test]
fn repacking_a_session_gives_the_same_layout() {
    let mut session = PackingSession::new(PackerConfig::new().size((64, 64)));
    for &size in &assorted_sizes(25) {
        session.add(InputItem::new(size).with_content_hash([size.0 as u8; 32]));
    }

    let first = render(&session.pack().unwrap());
    let second = render(&session.pack().unwrap());

    assert_eq!(first, second);
}
