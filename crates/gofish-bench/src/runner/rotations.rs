/// Generates deterministic turn-order rotations of the configured player
/// list, so each strategy takes a share of the opening asks.
#[derive(Debug)]
pub struct OrderRotations {
    orders: Vec<Vec<usize>>,
}

impl OrderRotations {
    pub fn new(players: usize, count: usize) -> Self {
        let limit = count.clamp(1, players.max(1));
        let mut orders = Vec::with_capacity(limit);
        for shift in 0..limit {
            orders.push((0..players).map(|index| (index + shift) % players).collect());
        }
        Self { orders }
    }

    pub fn as_slice(&self) -> &[Vec<usize>] {
        &self.orders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_rotation_keeps_the_configured_order() {
        let rotations = OrderRotations::new(4, 1);
        assert_eq!(rotations.as_slice(), &[vec![0, 1, 2, 3]]);
    }

    #[test]
    fn each_rotation_advances_the_opening_player() {
        let rotations = OrderRotations::new(3, 3);
        assert_eq!(
            rotations.as_slice().to_vec(),
            vec![vec![0, 1, 2], vec![1, 2, 0], vec![2, 0, 1]]
        );
    }

    #[test]
    fn caps_at_the_player_count() {
        let rotations = OrderRotations::new(2, 100);
        assert_eq!(rotations.as_slice().len(), 2);
    }
}
