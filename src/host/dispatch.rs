use anyhow::Result;
use log::{debug, info};

use crate::actions::{Action, ActionLookup, ActionSink};
use crate::label::GestureLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The empty label: nothing was recognized.
    NoGesture,
    /// Recognized, but the user bound nothing to it.
    Unbound,
    Sent(Action),
}

pub fn dispatch_gesture(
    label: &GestureLabel,
    lookup: &impl ActionLookup,
    sink: &mut impl ActionSink,
) -> Result<Dispatch> {
    if label.is_empty() {
        debug!("no gesture detected");
        return Ok(Dispatch::NoGesture);
    }
    let Some(binding) = lookup.action_for(label) else {
        info!("gesture '{label}' detected but not bound to any action");
        return Ok(Dispatch::Unbound);
    };
    sink.dispatch(label, binding)?;
    Ok(Dispatch::Sent(binding.action))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{ActionMap, Binding};

    #[derive(Default)]
    struct Recorder(Vec<(String, Action)>);

    impl ActionSink for Recorder {
        fn dispatch(&mut self, label: &GestureLabel, binding: &Binding) -> Result<()> {
            self.0.push((label.to_string(), binding.action));
            Ok(())
        }
    }

    #[test]
    fn empty_label_and_unbound_are_distinct() {
        let map = ActionMap::defaults();
        let mut rec = Recorder::default();

        let r = dispatch_gesture(&GestureLabel::empty(), &map, &mut rec).unwrap();
        assert_eq!(r, Dispatch::NoGesture);

        let up: GestureLabel = "up".parse().unwrap();
        assert_eq!(dispatch_gesture(&up, &map, &mut rec).unwrap(), Dispatch::Unbound);

        let left: GestureLabel = "left".parse().unwrap();
        assert_eq!(
            dispatch_gesture(&left, &map, &mut rec).unwrap(),
            Dispatch::Sent(Action::Back)
        );
        assert_eq!(rec.0, vec![("left".to_string(), Action::Back)]);
    }
}
