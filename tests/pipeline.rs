use handtrack::geometry::squared_distance;
use handtrack::{
    ConvexityDefect, Error, FingertipDetector, FrameSink, FrameSource, HandModel, HandReport,
    Pipeline, Point, StopFlag, StopSignal, Vision,
};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

const HEIGHT: i32 = 240;
const WIDTH: i32 = 320;

#[derive(Debug, Clone, Default)]
struct Scene {
    contour: Option<Vec<Point>>,
    defects: Vec<ConvexityDefect>,
}

/// Hands out the geometry stored in each scene instead of computing it.
#[derive(Default)]
struct Canned {
    pending: Vec<ConvexityDefect>,
    hull_calls: usize,
}

impl Vision for Canned {
    type Image = Scene;
    type Mask = Scene;

    fn frame_size(&self, _image: &Scene) -> (i32, i32) {
        (WIDTH, HEIGHT)
    }

    fn segment(&mut self, image: &Scene) -> Result<Scene, Error> {
        Ok(image.clone())
    }

    fn largest_contour(&mut self, mask: &Scene, contour: &mut Vec<Point>) -> Result<bool, Error> {
        contour.clear();
        self.pending = mask.defects.clone();

        match &mask.contour {
            Some(points) => {
                contour.extend_from_slice(points);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn convex_hull(&mut self, contour: &[Point], hull: &mut Vec<usize>) -> Result<(), Error> {
        self.hull_calls += 1;
        hull.clear();
        hull.extend(0..contour.len());
        Ok(())
    }

    fn convexity_defects(
        &mut self,
        _contour: &[Point],
        _hull: &[usize],
        defects: &mut Vec<ConvexityDefect>,
    ) -> Result<(), Error> {
        defects.clear();
        defects.extend_from_slice(&self.pending);
        Ok(())
    }
}

struct Frames(std::vec::IntoIter<Scene>);

impl FrameSource for Frames {
    type Image = Scene;

    fn next_frame(&mut self) -> Result<Option<Scene>, Error> {
        Ok(self.0.next())
    }
}

/// Remembers how many fingers were overlaid on every emitted frame.
#[derive(Default)]
struct Recorder {
    overlays: Vec<Option<usize>>,
}

impl FrameSink for Recorder {
    type Image = Scene;
    type Mask = Scene;

    fn emit(&mut self, _image: &mut Scene, _mask: &Scene, hand: Option<&HandModel>) -> Result<(), Error> {
        self.overlays.push(hand.map(|h| h.num_fingers()));
        Ok(())
    }
}

#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn depth(x: i32, y: i32) -> ConvexityDefect {
    let p = Point::new(x, y);
    ConvexityDefect::new(p, p, p, 40.0)
}

/// Circle of radius 50 around (100, 100) sampled every 10 degrees, with five
/// samples in the upper half pushed out to radius 90. Palm samples are snapped
/// onto the integer circle so that their distances to the center are all
/// equal and rounding does not create ripples.
fn open_hand() -> Scene {
    let lattice: Vec<(i32, i32)> = (-50..=50)
        .flat_map(|x| (-50..=50).map(move |y| (x, y)))
        .filter(|(x, y)| x * x + y * y == 2500)
        .collect();

    let spikes = [21, 24, 27, 30, 33];

    let contour = (0..36)
        .map(|k| {
            let a = (k as f64 * 10.0).to_radians();

            if spikes.contains(&k) {
                Point::new(
                    100 + (90.0 * a.cos()).round() as i32,
                    100 + (90.0 * a.sin()).round() as i32,
                )
            } else {
                let (fx, fy) = (50.0 * a.cos(), 50.0 * a.sin());
                let (x, y) = lattice
                    .iter()
                    .copied()
                    .min_by(|p, q| {
                        let dp = (p.0 as f64 - fx).powi(2) + (p.1 as f64 - fy).powi(2);
                        let dq = (q.0 as f64 - fx).powi(2) + (q.1 as f64 - fy).powi(2);
                        dp.partial_cmp(&dq).unwrap()
                    })
                    .unwrap();

                Point::new(100 + x, 100 + y)
            }
        })
        .collect();

    Scene {
        contour: Some(contour),
        defects: vec![
            depth(96, 100),
            depth(104, 100),
            depth(100, 96),
            depth(100, 104),
            depth(100, 100),
        ],
    }
}

fn pipeline() -> Pipeline<Canned> {
    Pipeline::new(Canned::default(), FingertipDetector::default())
}

#[test]
fn open_hand_passes_the_overlay_gate() {
    let mut pipeline = pipeline();

    pipeline.process(&open_hand()).unwrap();
    let hand = pipeline.overlay().expect("five fingers expected");

    assert_eq!(hand.num_fingers(), 5);
    assert_eq!(hand.center(), Point::new(100, 100));
    assert_eq!(hand.num_defects(), 5);
    assert!(hand.is_fresh());

    for tip in hand.fingers() {
        assert!(squared_distance(hand.center(), *tip) > 80 * 80);
        assert!(tip.y < 100);
    }
}

#[test]
fn processing_twice_gives_the_same_hand() {
    let scene = open_hand();
    let mut a = pipeline();
    let mut b = pipeline();

    a.process(&scene).unwrap();
    b.process(&scene).unwrap();
    b.process(&scene).unwrap();

    assert_eq!(a.hand().center(), b.hand().center());
    assert_eq!(a.hand().radius(), b.hand().radius());
    assert_eq!(a.hand().fingers(), b.hand().fingers());
    assert_eq!(a.hand().defects(), b.hand().defects());
}

#[test]
fn tiny_contour_never_reaches_detection() {
    let mut pipeline = pipeline();
    let scene = Scene {
        contour: Some(vec![Point::new(10, 10), Point::new(20, 20)]),
        defects: vec![depth(15, 15)],
    };

    pipeline.process(&scene).unwrap();

    assert_eq!(pipeline.vision().hull_calls, 0);
    assert_eq!(pipeline.hand().num_fingers(), 0);
    assert!(!pipeline.hand().is_fresh());
    assert!(pipeline.overlay().is_none());
}

#[test]
fn missing_contour_keeps_stale_center_without_overlay() {
    let mut pipeline = pipeline();

    pipeline.process(&open_hand()).unwrap();
    let radius = pipeline.hand().radius();

    pipeline.process(&Scene::default()).unwrap();

    assert_eq!(pipeline.hand().num_fingers(), 0);
    assert_eq!(pipeline.hand().center(), Point::new(100, 100));
    assert_eq!(pipeline.hand().radius(), radius);
    assert!(!pipeline.hand().is_fresh());
    assert!(pipeline.overlay().is_none());
}

#[test]
fn no_defects_means_no_fingers() {
    let mut pipeline = pipeline();
    pipeline.process(&open_hand()).unwrap();

    let mut scene = open_hand();
    scene.defects.clear();
    pipeline.process(&scene).unwrap();

    assert_eq!(pipeline.hand().num_fingers(), 0);
    assert!(pipeline.overlay().is_none());
}

#[test]
fn run_emits_every_frame_and_reports_each_one() {
    let out = SharedBuf::default();
    let mut pipeline = pipeline().with_reports(out.clone());

    let mut source = Frames(vec![open_hand(), Scene::default(), open_hand()].into_iter());
    let mut sink = Recorder::default();
    let mut never = || false;

    let stats = pipeline.run(&mut source, &mut sink, &mut never).unwrap();

    assert_eq!(stats.frames, 3);
    assert_eq!(stats.complete, 2);
    assert_eq!(sink.overlays, vec![Some(5), None, Some(5)]);

    let text = String::from_utf8(out.0.borrow().clone()).unwrap();
    let reports: Vec<HandReport> = text
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].center, Some([100, 100]));
    assert!(reports[0].complete);
    assert_eq!(reports[1].frame, 1);
    assert_eq!(reports[1].center, None);
    assert!(reports[1].fingers.is_empty());
}

/// Flips the stop flag once it has seen `after` frames.
struct StopAfter {
    flag: StopFlag,
    after: usize,
    seen: usize,
}

impl FrameSink for StopAfter {
    type Image = Scene;
    type Mask = Scene;

    fn emit(&mut self, _image: &mut Scene, _mask: &Scene, _hand: Option<&HandModel>) -> Result<(), Error> {
        self.seen += 1;
        if self.seen == self.after {
            self.flag.stop();
        }
        Ok(())
    }
}

#[test]
fn stop_is_checked_after_each_frame() {
    let mut pipeline = pipeline();
    let mut source = Frames(vec![open_hand(); 4].into_iter());

    let mut stop = StopFlag::new();
    let mut sink = StopAfter {
        flag: stop.clone(),
        after: 2,
        seen: 0,
    };

    let stats = pipeline.run(&mut source, &mut sink, &mut stop).unwrap();

    assert_eq!(stats.frames, 2);
    assert_eq!(sink.seen, 2);
    assert!(stop.should_stop());
}
