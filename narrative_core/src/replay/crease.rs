//! Crease resolution pre-pass.
//!
//! Feeds often omit the non-striker and, on run outs, the dismissed batter.
//! Both can be recovered by looking ahead: the batter who keeps facing after a
//! wicket survived it, and the first unfamiliar name after a wicket is the
//! replacement.

use cricket_rules::DeliveryEvent;

/// Fill missing `non_striker` and `dismissed` fields in place.
///
/// Fields already present are never overwritten.
pub fn resolve_crease(events: &mut [DeliveryEvent]) {
    let Some(first) = events.first() else {
        return;
    };

    // Insertion order decides which partner is "most recent".
    let mut active: Vec<String> = vec![first.batter.clone()];
    let partner = first.non_striker.clone().or_else(|| {
        events
            .iter()
            .map(|e| &e.batter)
            .find(|name| **name != first.batter)
            .cloned()
    });
    if let Some(partner) = partner {
        active.push(partner);
    }

    for i in 0..events.len() {
        let striker = events[i].batter.clone();
        admit(&mut active, &striker);
        if let Some(named) = events[i].non_striker.clone() {
            admit(&mut active, &named);
        } else {
            events[i].non_striker = active.iter().rev().find(|n| **n != striker).cloned();
        }

        if !events[i].is_wicket {
            continue;
        }

        let dismissed = match events[i].dismissed.clone() {
            Some(name) => name,
            None => {
                let inferred = infer_dismissed(&events[i + 1..], &active, &striker);
                events[i].dismissed = Some(inferred.clone());
                inferred
            }
        };

        active.retain(|n| *n != dismissed);
        let replacement = events[i + 1..]
            .iter()
            .map(|e| &e.batter)
            .find(|name| !active.contains(name) && **name != dismissed)
            .cloned();
        if let Some(replacement) = replacement {
            active.push(replacement);
        }
    }
}

fn admit(active: &mut Vec<String>, name: &str) {
    if !active.iter().any(|n| n == name) {
        active.push(name.to_string());
    }
}

/// The batter who is not seen facing again. Without a clear pair at the
/// crease, or when the innings ends first, the striker is assumed out.
fn infer_dismissed(rest: &[DeliveryEvent], active: &[String], striker: &str) -> String {
    if active.len() == 2 {
        let survivor = rest.iter().map(|e| &e.batter).find(|name| active.contains(name));
        if let Some(other) = survivor.and_then(|s| active.iter().find(|n| *n != s)) {
            return other.clone();
        }
    }
    striker.to_string()
}
