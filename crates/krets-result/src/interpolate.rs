/// Looks up `value` in `value_list` (assumed sorted) and linearly
/// interpolates the matching entry in `data_list`. Values outside the
/// table's range are linearly extrapolated using the nearest segment.
///
/// Panics if the two lists differ in length.
pub fn interpolate(value: f64, value_list: &[f64], data_list: &[f64]) -> f64 {
    assert_eq!(
        value_list.len(),
        data_list.len(),
        "interpolate() called using a value list that differs in length from a data list"
    );

    let n = value_list.len();
    let index_right = value_list.partition_point(|&v| v < value);

    if index_right > 0 && index_right < n {
        let index_left = index_right - 1;
        let percent = (value - value_list[index_left])
            / (value_list[index_right] - value_list[index_left]);
        data_list[index_left] + percent * (data_list[index_right] - data_list[index_left])
    } else if index_right == 0 {
        let percent = (value_list[0] - value) / (value_list[1] - value_list[0]);
        data_list[0] - percent * (data_list[1] - data_list[0])
    } else {
        let last = n - 1;
        let percent =
            (value - value_list[last]) / (value_list[last] - value_list[last - 1]);
        data_list[last] + percent * (data_list[last] - data_list[last - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_and_extrapolates_a_breakpoint_table() {
        let value_list = [1.0, 2.0, 3.0, 4.0];
        let data_list = [1.0, 5.0, 11.0, 19.0];

        assert_eq!(interpolate(1.5, &value_list, &data_list), 3.0);
        assert_eq!(interpolate(2.5, &value_list, &data_list), 8.0);
        assert_eq!(interpolate(3.5, &value_list, &data_list), 15.0);
        assert_eq!(interpolate(0.0, &value_list, &data_list), -3.0);
        assert_eq!(interpolate(5.0, &value_list, &data_list), 27.0);
    }
}
