use std::cell::RefCell;
use std::rc::Rc;

use layerblit::{
    AccelBufferId, BlitChannel, BlitRequest, BufferDescriptor, ChannelError, CompositionType,
    Compositor, CompositorError, DisplayHandle, FramePublisher, Layer, LayerList, NullChannel,
    PixelRect, SurfaceHandle,
};

/// Accelerator double: performs real copies against registered buffers,
/// records every request, and rejects anything that would leave a buffer.
struct TestAccelerator {
    buffers: Vec<Rc<BufferDescriptor>>,
    requests: Rc<RefCell<Vec<BlitRequest>>>,
}

impl TestAccelerator {
    fn new(buffers: Vec<Rc<BufferDescriptor>>) -> Self {
        Self {
            buffers,
            requests: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn lookup(&self, id: AccelBufferId) -> Result<&Rc<BufferDescriptor>, ChannelError> {
        self.buffers
            .iter()
            .find(|buffer| buffer.accel_id() == id)
            .ok_or(ChannelError::Device { status: -22 })
    }
}

impl BlitChannel for TestAccelerator {
    fn blit(&self, request: &BlitRequest) -> Result<(), ChannelError> {
        self.requests.borrow_mut().push(*request);
        let dst = self.lookup(request.dst)?;
        let src = self.lookup(request.src)?;

        let dst_origin = (request.dst_offset / 4) as usize;
        let src_origin = (request.src_offset / 4) as usize;
        for j in 0..request.rows as usize {
            for i in 0..request.columns as usize {
                let from = src_origin + i + j * request.src_stride as usize;
                let to = dst_origin + i + j * request.dst_stride as usize;
                let (Some(word), Some(slot)) = (src.words().get(from), dst.words().get(to))
                else {
                    return Err(ChannelError::Device { status: -14 });
                };
                slot.set(word.get());
            }
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
struct RecordingPublisher {
    presented: Rc<RefCell<Vec<(DisplayHandle, SurfaceHandle)>>>,
}

impl FramePublisher for RecordingPublisher {
    fn present(&mut self, display: DisplayHandle, surface: SurfaceHandle) -> anyhow::Result<()> {
        self.presented.borrow_mut().push((display, surface));
        Ok(())
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn patterned(stride: u32, rows: u32, id: i32) -> Rc<BufferDescriptor> {
    let buffer = BufferDescriptor::allocate(stride, rows, AccelBufferId(id));
    for (index, word) in buffer.words().iter().enumerate() {
        word.set(0x1000_0000 | index as u32);
    }
    Rc::new(buffer)
}

fn snapshot(buffer: &BufferDescriptor) -> Vec<u32> {
    buffer.words().iter().map(|word| word.get()).collect()
}

/// Base 100x100 at stride 100 with a 10x10 overlay placed at (5, 5).
fn overlay_scene(base_id: i32, overlay_id: i32) -> (LayerList, Rc<BufferDescriptor>, Rc<BufferDescriptor>) {
    let base_buf = Rc::new(BufferDescriptor::allocate(100, 100, AccelBufferId(base_id)));
    let overlay_buf = patterned(100, 100, overlay_id);

    let base = Layer::new(
        PixelRect::new(0, 0, 100, 100),
        PixelRect::new(0, 0, 100, 100),
        Some(base_buf.clone()),
    );
    let overlay = Layer::new(
        PixelRect::new(0, 0, 10, 10),
        PixelRect::new(5, 5, 15, 15),
        Some(overlay_buf.clone()),
    );

    (LayerList::new(vec![base, overlay]), base_buf, overlay_buf)
}

fn assert_overlay_landed(base: &BufferDescriptor, overlay: &BufferDescriptor) {
    for y in 0..100usize {
        for x in 0..100usize {
            let expected = if (5..15).contains(&x) && (5..15).contains(&y) {
                overlay.words()[(x - 5) + (y - 5) * 100].get()
            } else {
                0
            };
            assert_eq!(
                base.words()[x + y * 100].get(),
                expected,
                "pixel ({x}, {y})"
            );
        }
    }
}

#[test]
fn software_merge_places_overlay_at_its_display_offset() {
    init_tracing();
    let (mut list, base_buf, overlay_buf) = overlay_scene(0, 1);
    let publisher = RecordingPublisher::default();
    let log = publisher.presented.clone();
    let mut compositor = Compositor::new(Box::new(NullChannel), Box::new(publisher));

    compositor
        .compose(DisplayHandle(1), SurfaceHandle(1), &mut list)
        .unwrap();

    assert_eq!(list.layers[1].composition_type, CompositionType::Overlay);
    assert_overlay_landed(&base_buf, &overlay_buf);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn accelerated_and_software_paths_produce_identical_frames() {
    let (mut accel_list, accel_base, _) = overlay_scene(0, 1);
    let channel = TestAccelerator::new(vec![
        accel_list.layers[0].buffer.clone().unwrap(),
        accel_list.layers[1].buffer.clone().unwrap(),
    ]);
    let mut accelerated =
        Compositor::new(Box::new(channel), Box::new(RecordingPublisher::default()));
    accelerated
        .compose(DisplayHandle(0), SurfaceHandle(0), &mut accel_list)
        .unwrap();

    let (mut soft_list, soft_base, _) = overlay_scene(2, 3);
    let mut software =
        Compositor::new(Box::new(NullChannel), Box::new(RecordingPublisher::default()));
    software
        .compose(DisplayHandle(0), SurfaceHandle(0), &mut soft_list)
        .unwrap();

    assert_eq!(snapshot(&accel_base), snapshot(&soft_base));
}

#[test]
fn compose_is_idempotent_for_unchanged_inputs() {
    let (mut list, base_buf, _) = overlay_scene(0, 1);
    let mut compositor = Compositor::new(
        Box::new(NullChannel),
        Box::new(RecordingPublisher::default()),
    );

    compositor
        .compose(DisplayHandle(0), SurfaceHandle(0), &mut list)
        .unwrap();
    let first = snapshot(&base_buf);

    compositor
        .compose(DisplayHandle(0), SurfaceHandle(0), &mut list)
        .unwrap();
    assert_eq!(snapshot(&base_buf), first);
}

#[test]
fn oversized_source_rect_reports_out_of_bounds_but_still_presents() {
    init_tracing();
    let base_buf = Rc::new(BufferDescriptor::allocate(200, 200, AccelBufferId(0)));
    let overlay_buf = patterned(100, 100, 1);

    let base = Layer::new(
        PixelRect::new(0, 0, 200, 200),
        PixelRect::new(0, 0, 200, 200),
        Some(base_buf.clone()),
    );
    let overlay = Layer::new(
        PixelRect::new(90, 90, 110, 110),
        PixelRect::new(0, 0, 20, 20),
        Some(overlay_buf),
    );
    let mut list = LayerList::new(vec![base, overlay]);

    let publisher = RecordingPublisher::default();
    let log = publisher.presented.clone();
    let mut compositor = Compositor::new(Box::new(NullChannel), Box::new(publisher));

    let err = compositor
        .compose(DisplayHandle(0), SurfaceHandle(0), &mut list)
        .unwrap_err();
    assert!(matches!(err, CompositorError::OutOfBounds { .. }));
    assert_eq!(log.borrow().len(), 1);

    // The column-major prefix before the violation stayed written.
    assert_ne!(base_buf.words()[0].get(), 0);
}

#[test]
fn null_overlay_buffer_leaves_the_base_unchanged() {
    let base_buf = Rc::new(BufferDescriptor::allocate(100, 100, AccelBufferId(0)));
    let base = Layer::new(
        PixelRect::new(0, 0, 100, 100),
        PixelRect::new(0, 0, 100, 100),
        Some(base_buf.clone()),
    );
    let hole = Layer::new(
        PixelRect::new(0, 0, 10, 10),
        PixelRect::new(5, 5, 15, 15),
        None,
    );
    let mut list = LayerList::new(vec![base, hole]);

    let mut compositor = Compositor::new(
        Box::new(NullChannel),
        Box::new(RecordingPublisher::default()),
    );
    compositor
        .compose(DisplayHandle(0), SurfaceHandle(0), &mut list)
        .unwrap();

    assert!(base_buf.words().iter().all(|word| word.get() == 0));
}

#[test]
fn single_layer_list_skips_planning_and_blitting() {
    let base_buf = Rc::new(BufferDescriptor::allocate(10, 10, AccelBufferId(0)));
    let base = Layer::new(
        PixelRect::new(0, 0, 10, 10),
        PixelRect::new(0, 0, 10, 10),
        Some(base_buf.clone()),
    );
    let mut list = LayerList::new(vec![base]);

    let channel = TestAccelerator::new(vec![base_buf]);
    let requests = channel.requests.clone();

    let publisher = RecordingPublisher::default();
    let log = publisher.presented.clone();
    let mut compositor = Compositor::new(Box::new(channel), Box::new(publisher));

    compositor.prepare(&mut list).unwrap();
    assert_eq!(
        list.layers[0].composition_type,
        CompositionType::Framebuffer
    );

    compositor
        .compose(DisplayHandle(9), SurfaceHandle(9), &mut list)
        .unwrap();
    assert!(requests.borrow().is_empty());
    assert_eq!(
        log.borrow().as_slice(),
        &[(DisplayHandle(9), SurfaceHandle(9))]
    );
}

#[test]
fn failed_accelerator_still_satisfies_the_reference_output() {
    struct FailingAccelerator;
    impl BlitChannel for FailingAccelerator {
        fn blit(&self, _request: &BlitRequest) -> Result<(), ChannelError> {
            Err(ChannelError::Device { status: -5 })
        }
    }

    let (mut list, base_buf, overlay_buf) = overlay_scene(0, 1);
    let mut compositor = Compositor::new(
        Box::new(FailingAccelerator),
        Box::new(RecordingPublisher::default()),
    );
    compositor
        .compose(DisplayHandle(0), SurfaceHandle(0), &mut list)
        .unwrap();

    assert_overlay_landed(&base_buf, &overlay_buf);
}
