use crate::{Error, MAX_UPPER_BOUND, OrbOfConfusion, Partitions};

const SEED1: u64 = 0x0123_4567_89AB_CDEF;
const SEED2: u64 = 0xFEDC_BA98_7654_3210;

/// Small deterministic generator for sampling large domains.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 1
    }
}

fn run_is_a_permutation(orb: &OrbOfConfusion) {
    let bound = orb.upper_bound();
    let mut seen = vec![false; bound as usize];
    for raw in 0..bound {
        let scrambled = orb.transform(raw).unwrap();
        assert!(
            scrambled < bound,
            "{raw} -> {scrambled} escaped [0, {bound})"
        );
        assert!(!seen[scrambled as usize], "{scrambled} produced twice");
        seen[scrambled as usize] = true;
        assert_eq!(orb.invert(scrambled).unwrap(), raw);
    }
    assert!(seen.iter().all(|hit| *hit));
}

fn run_sampled_round_trip(orb: &OrbOfConfusion, samples: usize) {
    let mut rng = Lcg(orb.upper_bound());
    let mut images = std::collections::HashSet::with_capacity(samples);
    for _ in 0..samples {
        let raw = rng.next() % orb.upper_bound();
        let scrambled = orb.transform(raw).unwrap();
        assert!(scrambled < orb.upper_bound());
        assert_eq!(orb.invert(scrambled).unwrap(), raw);
        images.insert((raw, scrambled));
    }
    // Distinct inputs never share an image.
    let mut by_image = std::collections::HashMap::new();
    for (raw, scrambled) in images {
        assert_eq!(*by_image.entry(scrambled).or_insert(raw), raw);
    }
}

#[test]
fn enumerated_bijection_for_moderate_bounds() {
    let partitions = Partitions::default();
    for bound in [1, 2, 3, 4, 5, 17, 255, 256, 257, 1000, 4099] {
        let orb = OrbOfConfusion::new(bound, &partitions, SEED1, SEED2).unwrap();
        run_is_a_permutation(&orb);
    }
}

#[test]
fn enumerated_bijection_for_one_hundred_thousand() {
    let orb = OrbOfConfusion::new(100_000, &Partitions::default(), SEED1, SEED2).unwrap();
    assert_eq!(orb.partition_sizes(), vec![256, 256, 2]);
    assert_eq!(orb.domain_size(), 131_072);
    run_is_a_permutation(&orb);
}

#[test]
fn enumerated_bijection_for_decimal_partitions() {
    let partitions = Partitions::decimal(&[2, 2, 2]).unwrap();
    let orb = OrbOfConfusion::new(100_000, &partitions, SEED1, SEED2).unwrap();
    assert_eq!(orb.partition_sizes(), vec![100, 100, 10]);
    run_is_a_permutation(&orb);

    let orb = OrbOfConfusion::new(99_991, &partitions, 3, 5).unwrap();
    run_is_a_permutation(&orb);
}

#[test]
fn enumerated_bijection_across_seeds() {
    let partitions = Partitions::bits(&[4, 4, 4, 4]).unwrap();
    for (seed1, seed2) in [(0, 0), (1, 0), (0, 1), (u64::MAX, u64::MAX), (SEED1, SEED2)] {
        let orb = OrbOfConfusion::new(50_000, &partitions, seed1, seed2).unwrap();
        run_is_a_permutation(&orb);
    }
}

#[test]
fn sampled_bijection_for_large_bounds() {
    let partitions = Partitions::default();
    for bound in [1 << 40, 1_000_000_000_000_000_000, MAX_UPPER_BOUND - 1, MAX_UPPER_BOUND] {
        let orb = OrbOfConfusion::new(bound, &partitions, SEED1, SEED2).unwrap();
        run_sampled_round_trip(&orb, 20_000);
    }
}

#[test]
fn edges_of_the_full_domain() {
    let orb = OrbOfConfusion::new(MAX_UPPER_BOUND, &Partitions::default(), SEED1, SEED2).unwrap();
    assert_eq!(orb.domain_size(), MAX_UPPER_BOUND);
    for raw in [0, 1, MAX_UPPER_BOUND - 2, MAX_UPPER_BOUND - 1] {
        let scrambled = orb.transform(raw).unwrap();
        assert_eq!(orb.invert(scrambled).unwrap(), raw);
    }
    assert!(orb.transform_signed(i64::MAX).unwrap() >= 0);
}

#[test]
fn deterministic_across_instances() {
    let partitions = Partitions::default();
    let a = OrbOfConfusion::new(1 << 20, &partitions, SEED1, SEED2).unwrap();
    let b = OrbOfConfusion::new(1 << 20, &partitions.clone(), SEED1, SEED2).unwrap();
    assert_eq!(a, b);

    for raw in (0..1 << 20).step_by(997) {
        let first = a.transform(raw).unwrap();
        assert_eq!(a.transform(raw).unwrap(), first);
        assert_eq!(b.transform(raw).unwrap(), first);
    }
}

#[test]
fn seeds_select_different_permutations() {
    let partitions = Partitions::default();
    let a = OrbOfConfusion::new(100_000, &partitions, 1, 2).unwrap();
    let b = OrbOfConfusion::new(100_000, &partitions, 1, 3).unwrap();
    let c = OrbOfConfusion::new(100_000, &partitions, 4, 2).unwrap();

    let differs = |x: &OrbOfConfusion, y: &OrbOfConfusion| {
        (0..1000)
            .filter(|raw| {
                x.transform(*raw).unwrap() != y.transform(*raw).unwrap()
            })
            .count()
    };
    assert!(differs(&a, &b) > 900);
    assert!(differs(&a, &c) > 900);
}

#[test]
fn consecutive_inputs_look_unrelated() {
    let orb = OrbOfConfusion::new(100_000, &Partitions::default(), SEED1, SEED2).unwrap();
    let images: Vec<u64> = (0..100_000).map(|raw| orb.transform(raw).unwrap()).collect();

    let pairs = images.len() - 1;
    let adjacent = images
        .windows(2)
        .filter(|w| w[0].abs_diff(w[1]) == 1)
        .count();
    let ascending = images.windows(2).filter(|w| w[0] < w[1]).count();
    let near = images
        .windows(2)
        .filter(|w| w[0].abs_diff(w[1]) < 100)
        .count();

    assert!(adjacent < pairs / 1000, "{adjacent} adjacent images");
    assert!(near < pairs / 100, "{near} near-adjacent images");
    assert!(
        (pairs * 4 / 10..pairs * 6 / 10).contains(&ascending),
        "{ascending} of {pairs} steps ascend"
    );

    // Differences between consecutive images don't repeat like an affine map.
    let strides: std::collections::HashSet<i128> = images
        .windows(2)
        .take(1000)
        .map(|w| i128::from(w[1]) - i128::from(w[0]))
        .collect();
    assert!(strides.len() > 900);
}

#[test]
fn rejects_out_of_domain_inputs() {
    let orb = OrbOfConfusion::new(1000, &Partitions::default(), SEED1, SEED2).unwrap();
    assert_eq!(
        orb.transform(1000),
        Err(Error::OutOfDomain {
            value: 1000,
            upper_bound: 1000
        })
    );
    assert!(orb.transform(u64::MAX).is_err());
    assert!(orb.invert(1000).is_err());
    assert_eq!(
        orb.transform_signed(-1),
        Err(Error::OutOfDomain {
            value: -1,
            upper_bound: 1000
        })
    );
    assert!(orb.transform_signed(i64::MIN).is_err());
    assert!(orb.transform_signed(999).is_ok());
}

#[test]
fn rejects_invalid_bounds() {
    let partitions = Partitions::default();
    assert!(matches!(
        OrbOfConfusion::new(0, &partitions, SEED1, SEED2),
        Err(Error::InvalidConfig { .. })
    ));
    assert!(matches!(
        OrbOfConfusion::new(MAX_UPPER_BOUND + 1, &partitions, SEED1, SEED2),
        Err(Error::InvalidConfig { .. })
    ));
    assert!(matches!(
        OrbOfConfusion::new_signed(-5, &partitions, SEED1, SEED2),
        Err(Error::InvalidConfig { .. })
    ));
    assert!(matches!(
        OrbOfConfusion::new_signed(0, &partitions, SEED1, SEED2),
        Err(Error::InvalidConfig { .. })
    ));

    let narrow = Partitions::bits(&[8, 8]).unwrap();
    assert!(OrbOfConfusion::new(1 << 16, &narrow, SEED1, SEED2).is_ok());
    assert!(matches!(
        OrbOfConfusion::new((1 << 16) + 1, &narrow, SEED1, SEED2),
        Err(Error::InvalidConfig { .. })
    ));
}

#[test]
fn shared_across_threads() {
    let orb = OrbOfConfusion::new(1 << 24, &Partitions::default(), SEED1, SEED2).unwrap();
    let expected: Vec<u64> = (0..10_000).map(|raw| orb.transform(raw).unwrap()).collect();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for (raw, image) in expected.iter().enumerate() {
                    assert_eq!(orb.transform(raw as u64).unwrap(), *image);
                }
            });
        }
    });
}
