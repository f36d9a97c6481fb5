use crate::models::Place;

/// Order places into a visiting sequence with the nearest-neighbor heuristic.
///
/// The walk starts at the first place and repeatedly moves to the closest
/// place not yet visited. The scan runs left to right and only a strictly
/// smaller distance displaces the incumbent, so ties go to the earliest
/// remaining place. Greedy, not an optimal tour.
pub fn order_by_nearest_neighbor(places: Vec<Place>) -> Vec<Place> {
    if places.len() <= 1 {
        return places;
    }

    let mut remaining = places;
    let mut ordered = Vec::with_capacity(remaining.len());
    let mut current = remaining.remove(0);

    while !remaining.is_empty() {
        let mut nearest_idx = 0;
        let mut shortest = current.distance_to(&remaining[0]);

        for (idx, candidate) in remaining.iter().enumerate().skip(1) {
            let distance = current.distance_to(candidate);
            if distance < shortest {
                shortest = distance;
                nearest_idx = idx;
            }
        }

        // `remove` keeps the relative order of the rest for tie-breaking
        let next = remaining.remove(nearest_idx);
        ordered.push(std::mem::replace(&mut current, next));
    }
    ordered.push(current);

    ordered
}
