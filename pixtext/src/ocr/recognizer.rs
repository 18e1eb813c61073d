use super::normalize::NormalizedImage;
use super::types::Detection;

/// The text-recognition capability behind the engine handle.
///
/// Implementations are constructed once per process and then shared by every
/// request, so `detect` takes `&self`; engines that wrap non-thread-safe state
/// serialize access internally. `detect` is blocking and is always called from
/// a blocking worker thread.
pub trait Recognizer: Send + Sync {
    fn name(&self) -> &str;

    /// Detections in the engine's scan order. An empty vector means no text.
    fn detect(&self, image: &NormalizedImage) -> anyhow::Result<Vec<Detection>>;
}

/// Group Tesseract TSV word rows into one detection per text line.
///
/// Rows are `level page block par line word left top width height conf text`.
/// Only word rows (level 5) with a non-negative confidence and non-blank text
/// contribute; line confidence is the mean word confidence scaled to `[0, 1]`.
pub fn parse_tsv(tsv: &str) -> Vec<Detection> {
    let mut detections = Vec::new();
    let mut current: Option<((u32, u32, u32, u32), Vec<String>, Vec<f32>)> = None;

    for row in tsv.lines() {
        let cols: Vec<&str> = row.splitn(12, '\t').collect();
        if cols.len() < 12 || cols[0] != "5" {
            continue;
        }

        let key = match (
            cols[1].parse::<u32>(),
            cols[2].parse::<u32>(),
            cols[3].parse::<u32>(),
            cols[4].parse::<u32>(),
        ) {
            (Ok(page), Ok(block), Ok(par), Ok(line)) => (page, block, par, line),
            _ => continue,
        };
        let conf: f32 = match cols[10].trim().parse() {
            Ok(c) if c >= 0.0 => c,
            _ => continue,
        };
        let word = cols[11].trim();
        if word.is_empty() {
            continue;
        }

        match current.as_mut() {
            Some((line_key, words, confs)) if *line_key == key => {
                words.push(word.to_string());
                confs.push(conf);
            }
            _ => {
                if let Some(done) = current.take() {
                    detections.push(finish_line(done));
                }
                current = Some((key, vec![word.to_string()], vec![conf]));
            }
        }
    }

    if let Some(done) = current.take() {
        detections.push(finish_line(done));
    }

    detections
}

fn finish_line((_, words, confs): ((u32, u32, u32, u32), Vec<String>, Vec<f32>)) -> Detection {
    let mean = confs.iter().sum::<f32>() / confs.len() as f32;
    Detection::new(words.join(" "), mean / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE_TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t400\t300\t-1\t
2\t1\t1\t0\t0\t0\t10\t10\t200\t40\t-1\t
3\t1\t1\t1\t0\t0\t10\t10\t200\t40\t-1\t
4\t1\t1\t1\t1\t0\t10\t10\t200\t20\t-1\t
5\t1\t1\t1\t1\t1\t10\t10\t80\t20\t96.5\tHello
5\t1\t1\t1\t1\t2\t95\t10\t90\t20\t91.5\tworld
4\t1\t1\t1\t2\t0\t10\t30\t200\t20\t-1\t
5\t1\t1\t1\t2\t1\t10\t30\t60\t20\t80\tsecond
5\t1\t1\t1\t2\t2\t75\t30\t40\t20\t-1\t
5\t1\t1\t1\t2\t3\t120\t30\t40\t20\t60\t
5\t1\t2\t1\t1\t1\t10\t200\t60\t20\t70\tblock
";

    #[test]
    fn test_parse_tsv_groups_words_into_lines() {
        let detections = parse_tsv(SAMPLE_TSV);
        let texts: Vec<&str> = detections.iter().map(|d| d.text()).collect();
        assert_eq!(texts, vec!["Hello world", "second", "block"]);

        assert!((detections[0].confidence() - 0.94).abs() < 1e-4);
        assert!((detections[1].confidence() - 0.80).abs() < 1e-4);
        assert!((detections[2].confidence() - 0.70).abs() < 1e-4);
    }

    #[test]
    fn test_parse_tsv_empty_page() {
        let tsv = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t400\t300\t-1\t
";
        assert!(parse_tsv(tsv).is_empty());
        assert!(parse_tsv("").is_empty());
    }

    #[test]
    fn test_parse_tsv_ignores_malformed_rows() {
        let tsv = "5\t1\t1\n5\tx\t1\t1\t1\t1\t0\t0\t1\t1\t90\tbad\n5\t1\t1\t1\t1\t1\t0\t0\t1\t1\t90\tgood\n";
        let detections = parse_tsv(tsv);
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].text(), "good");
    }
}
