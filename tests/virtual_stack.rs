use std::sync::Arc;
use virtual_stack::converter::{Clamp, LinearRange};
use virtual_stack::stack::{thread_pool, Sequential};
use virtual_stack::volume::{ArrayVolume, FnVolume, PlanarVolume, Volume};
use virtual_stack::{ImageStack, PixelBuffer, StackError, VirtualStack, WriteOutcome};

fn digits(p: &[i64]) -> f64 {
    p.iter().enumerate().map(|(d, &c)| c as f64 * 10f64.powi(d as i32)).sum()
}

#[test]
fn renders_third_slice_of_small_volume() {
    let v = FnVolume::zero_based(vec![4, 3, 5], digits).unwrap();
    let stack = VirtualStack::<_, u8, _>::new(v, Clamp).unwrap();
    assert_eq!((stack.width(), stack.height(), stack.len()), (4, 3, 5));

    let expected = (0..3)
        .flat_map(|y| (0..4).map(move |x| (x + 10 * y + 200) as u8))
        .collect::<Vec<_>>();
    assert_eq!(stack.read_slice(2).unwrap(), PixelBuffer::U8(expected));

    // 400 + x + 10y saturates
    assert_eq!(stack.read_slice(4).unwrap(), PixelBuffer::U8(vec![255; 12]));
}

#[test]
fn slice_index_boundaries() {
    let v = FnVolume::zero_based(vec![2, 2, 3, 2], digits).unwrap();
    let stack = VirtualStack::<_, u16, _>::new(v, Clamp).unwrap();
    assert_eq!(stack.len(), 6);

    assert!(stack.read_slice(0).is_ok());
    assert_eq!(stack.read_slice(5).unwrap(), PixelBuffer::U16(vec![1200, 1201, 1210, 1211]));
    assert!(matches!(stack.read_slice(-1), Err(StackError::OutOfRange { index: -1, len: 6 })));
    assert!(matches!(stack.read_slice(6), Err(StackError::OutOfRange { index: 6, len: 6 })));
}

#[test]
fn parallel_rendering_matches_sequential() {
    let v = ArrayVolume::from_fn(vec![37, 23, 4], |p| (p[0] * 31 + p[1] * 7 + p[2] * 1000) as f32 * 0.37).unwrap();
    let converter = LinearRange::new(0.0, 5000.0);
    let sequential = VirtualStack::<_, f32, _>::new(&v, converter).unwrap();

    for threads in [1, 2, 4, 16] {
        let pool = Arc::new(thread_pool(threads).unwrap());
        let parallel = VirtualStack::<_, f32, _>::new(&v, converter)
            .unwrap()
            .with_executor(pool);
        for i in 0..sequential.len() as i64 {
            let (PixelBuffer::F32(a), PixelBuffer::F32(b)) =
                (sequential.read_slice(i).unwrap(), parallel.read_slice(i).unwrap())
            else {
                panic!("expected float pixels");
            };
            assert!(a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits()), "threads {threads}, slice {i}");
        }
    }
}

#[test]
fn writing_back_a_rendered_slice_changes_nothing() {
    let original = ArrayVolume::from_fn(vec![5, 4, 3, 2], |p| (p[0] + 5 * p[1] + 20 * p[2] + 60 * p[3]) as u16)
        .unwrap()
        .with_min(vec![10, -4, 2, 0])
        .unwrap();
    let mut stack = VirtualStack::<_, u16, _>::new(original.clone(), Clamp)
        .unwrap()
        .with_executor(Arc::new(Sequential));
    stack.set_writable(true);

    for i in 0..stack.len() as i64 {
        let pixels = stack.read_slice(i).unwrap();
        assert_eq!(stack.write_slice(i, &pixels).unwrap(), WriteOutcome::Written(20));
    }
    assert_eq!(stack.into_source().data(), original.data());
}

#[test]
fn writes_reach_only_the_addressed_plane() {
    let planes = (0..6).map(|z| vec![z as u8; 6]).collect();
    let v = PlanarVolume::new(vec![3, 2, 3, 2], planes).unwrap();
    let mut stack = VirtualStack::<_, u8, _>::new(v, Clamp).unwrap();

    let zeros = PixelBuffer::U8(vec![0; 6]);
    assert_eq!(stack.write_slice(4, &zeros).unwrap(), WriteOutcome::ReadOnly);
    assert_eq!(stack.read_slice(4).unwrap(), PixelBuffer::U8(vec![4; 6]));

    stack.set_writable(true);
    assert_eq!(stack.write_slice(4, &zeros).unwrap(), WriteOutcome::Written(6));
    let v = stack.into_source();
    for (z, plane) in v.planes().iter().enumerate() {
        let expected = if z == 4 { 0 } else { z as u8 };
        assert!(plane.iter().all(|&s| s == expected), "plane {z}");
    }
}

#[test]
fn float_writes_round_into_integer_volumes() {
    let v = ArrayVolume::new(vec![2, 1, 1], vec![0u8, 0]).unwrap();
    let mut stack = VirtualStack::<_, f32, _>::new(v, Clamp).unwrap();
    stack.set_writable(true);
    stack.write_slice(0, &PixelBuffer::F32(vec![2.6, 300.0])).unwrap();
    assert_eq!(stack.source().data(), &[3, 255]);
    assert_eq!(stack.source().get(&[1, 0, 0]), 255);
}

#[test]
fn host_view_numbers_slices_from_one() {
    let v = FnVolume::zero_based(vec![1, 1, 4], digits).unwrap();
    let stack = VirtualStack::<_, u16, _>::new(v, Clamp).unwrap();
    let host: &dyn ImageStack = &stack;
    let all = (1..=host.size()).map(|n| host.pixels(n).unwrap()).collect::<Vec<_>>();
    assert_eq!(
        all,
        (0..4).map(|z| PixelBuffer::U16(vec![z * 100])).collect::<Vec<_>>()
    );
}
