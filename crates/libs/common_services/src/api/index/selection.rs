use common_types::{DetectedFace, MultiFacePolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionError {
    NoUsableFace,
    Ambiguous(usize),
}

/// Drops faces the extractor is not confident enough about.
fn usable(faces: Vec<DetectedFace>, min_confidence: f32) -> Vec<DetectedFace> {
    faces
        .into_iter()
        .filter(|f| f.confidence >= min_confidence)
        .collect()
}

/// The most confident face; on equal confidence the one the extractor reported first.
fn most_confident(faces: Vec<DetectedFace>) -> Option<DetectedFace> {
    faces
        .into_iter()
        .reduce(|best, face| if face.confidence > best.confidence { face } else { best })
}

/// Picks the faces of a photo that get a record, according to `policy`.
pub fn select_faces(
    faces: Vec<DetectedFace>,
    min_confidence: f32,
    policy: MultiFacePolicy,
) -> Result<Vec<DetectedFace>, SelectionError> {
    let faces = usable(faces, min_confidence);
    match (faces.len(), policy) {
        (0, _) => Err(SelectionError::NoUsableFace),
        (1, _) | (_, MultiFacePolicy::IndexAll) => Ok(faces),
        (n, MultiFacePolicy::Reject) => Err(SelectionError::Ambiguous(n)),
        (_, MultiFacePolicy::HighestConfidence) => {
            Ok(most_confident(faces).into_iter().collect())
        }
    }
}

/// Picks the face a selfie search runs with. Only `Reject` refuses a crowded selfie,
/// every other policy searches with the most confident face.
pub fn select_query_face(
    faces: Vec<DetectedFace>,
    min_confidence: f32,
    policy: MultiFacePolicy,
) -> Result<DetectedFace, SelectionError> {
    let faces = usable(faces, min_confidence);
    if faces.len() > 1 && policy == MultiFacePolicy::Reject {
        return Err(SelectionError::Ambiguous(faces.len()));
    }
    most_confident(faces).ok_or(SelectionError::NoUsableFace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_types::{BoundingRegion, Descriptor, ModelVersion};

    fn face(confidence: f32, marker: f32) -> DetectedFace {
        let model = ModelVersion::new("test", 2);
        DetectedFace {
            descriptor: Descriptor::new(&model, vec![marker, 1.0]).expect("valid"),
            confidence,
            region: BoundingRegion {
                x: 0.0,
                y: 0.0,
                width: 0.5,
                height: 0.5,
            },
        }
    }

    fn markers(faces: &[DetectedFace]) -> Vec<f32> {
        faces.iter().map(|f| f.descriptor.values()[0]).collect()
    }

    #[test]
    fn low_confidence_faces_do_not_count() {
        let result = select_faces(vec![face(0.2, 1.0)], 0.5, MultiFacePolicy::IndexAll);
        assert_eq!(result, Err(SelectionError::NoUsableFace));

        let result = select_faces(vec![], 0.5, MultiFacePolicy::IndexAll);
        assert_eq!(result, Err(SelectionError::NoUsableFace));
    }

    #[test]
    fn index_all_keeps_every_usable_face() {
        let faces = vec![face(0.9, 1.0), face(0.1, 2.0), face(0.8, 3.0)];
        let selected = select_faces(faces, 0.5, MultiFacePolicy::IndexAll).expect("faces");
        assert_eq!(markers(&selected), [1.0_f32, 3.0]);
    }

    #[test]
    fn highest_confidence_prefers_first_on_ties() {
        let faces = vec![face(0.7, 1.0), face(0.9, 2.0), face(0.9, 3.0)];
        let selected =
            select_faces(faces, 0.5, MultiFacePolicy::HighestConfidence).expect("faces");
        assert_eq!(markers(&selected), [2.0_f32]);
    }

    #[test]
    fn reject_refuses_multiple_faces_only() {
        let two = vec![face(0.7, 1.0), face(0.9, 2.0)];
        assert_eq!(
            select_faces(two, 0.5, MultiFacePolicy::Reject),
            Err(SelectionError::Ambiguous(2))
        );

        let one = vec![face(0.7, 1.0), face(0.3, 2.0)];
        let selected = select_faces(one, 0.5, MultiFacePolicy::Reject).expect("one face");
        assert_eq!(markers(&selected), [1.0_f32]);
    }

    #[test]
    fn query_face_is_most_confident() {
        let faces = vec![face(0.7, 1.0), face(0.95, 2.0)];
        let selected =
            select_query_face(faces, 0.5, MultiFacePolicy::IndexAll).expect("query face");
        assert_eq!(markers(&[selected]), [2.0_f32]);

        let faces = vec![face(0.7, 1.0), face(0.95, 2.0)];
        assert_eq!(
            select_query_face(faces, 0.5, MultiFacePolicy::Reject),
            Err(SelectionError::Ambiguous(2))
        );
    }
}
